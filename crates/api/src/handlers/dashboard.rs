//! Handler for the command-center dashboard.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tms_core::dashboard::{build_view, DashboardView, HistoryWindow, StatusFilter};
use tms_core::rbac::{Action, Module};
use tms_core::search::SearchQuery;
use tms_db::models::trip::{TripDetail, TripFilter};
use tms_db::repositories::{TripRepo, TripStatusRepo};

use crate::error::AppResult;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /dashboard`.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Days of history to include; `-1` for all time. Defaults to the
    /// configured window.
    pub history_days: Option<i64>,
    /// Comma-separated statuses narrowing the displayed list.
    pub status: Option<String>,
    pub q: Option<String>,
}

/// GET /api/v1/dashboard
///
/// The summary tiles are computed from the windowed set before the status
/// filter and search are applied, so toggling either changes the list but
/// never the numbers.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Query(params): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<DashboardView<TripDetail>>>> {
    authz.require(Module::Dashboard, Action::View)?;

    let window = match params.history_days {
        Some(days) => HistoryWindow::from_days(days)?,
        None => state.config.dashboard_window,
    };
    let filter = TripFilter {
        region_id: authz.scope().region_id(),
        window_cutoff: window.cutoff(Utc::now()),
        ..Default::default()
    };

    let rows = TripRepo::list_all(&state.pool, &filter).await?;
    let history = TripRepo::resolve(&state.pool, rows).await?;
    let catalog = TripStatusRepo::load_catalog(&state.pool).await?;

    let view = build_view(
        history,
        window,
        &catalog,
        &StatusFilter::parse(params.status.as_deref()),
        &SearchQuery::parse(params.q.as_deref()),
    );
    tracing::debug!(
        history_days = view.history_days,
        total = view.summary.total.trips,
        shown = view.trips.len(),
        "Dashboard built",
    );

    Ok(Json(DataResponse { data: view }))
}
