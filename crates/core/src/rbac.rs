//! Role-based access control.
//!
//! Permissions are opt-in: every module starts as `{view: false, edit: false}`
//! and stored `role_permissions` rows are overlaid on top. The built-in super
//! admin role bypasses the matrix entirely. Non-global callers (those holding
//! a `region_id`) are additionally confined to their region via
//! [`RegionScope`], which the query layer turns into an extra predicate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::is_super_admin_name;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Module registry
// ---------------------------------------------------------------------------

/// Functional areas addressable by permission rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Dashboard,
    Trips,
    TripTracking,
    Vehicles,
    Users,
    Roles,
    Settings,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Dashboard,
        Module::Trips,
        Module::TripTracking,
        Module::Vehicles,
        Module::Users,
        Module::Roles,
        Module::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Trips => "trips",
            Module::TripTracking => "trip_tracking",
            Module::Vehicles => "vehicles",
            Module::Users => "users",
            Module::Roles => "roles",
            Module::Settings => "settings",
        }
    }

    pub fn parse(code: &str) -> Option<Module> {
        Module::ALL.into_iter().find(|m| m.as_str() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
}

// ---------------------------------------------------------------------------
// Permission matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub can_view: bool,
    pub can_edit: bool,
}

impl Grant {
    pub const FULL: Grant = Grant {
        can_view: true,
        can_edit: true,
    };

    /// Edit implies view.
    pub fn normalized(self) -> Grant {
        Grant {
            can_view: self.can_view || self.can_edit,
            can_edit: self.can_edit,
        }
    }

    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
        }
    }
}

/// A role's resolved permissions, one entry per known module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSet(BTreeMap<Module, Grant>);

impl PermissionSet {
    /// Everything denied.
    pub fn deny_all() -> Self {
        Self(Module::ALL.into_iter().map(|m| (m, Grant::default())).collect())
    }

    /// Everything allowed.
    pub fn full() -> Self {
        Self(Module::ALL.into_iter().map(|m| (m, Grant::FULL)).collect())
    }

    /// Overlay stored `(module_code, can_view, can_edit)` rows on a deny-all
    /// base. Unknown module codes are ignored.
    pub fn resolve<'a>(rows: impl IntoIterator<Item = (&'a str, bool, bool)>) -> Self {
        let mut set = Self::deny_all();
        for (code, can_view, can_edit) in rows {
            if let Some(module) = Module::parse(code) {
                set.0.insert(module, Grant { can_view, can_edit });
            }
        }
        set
    }

    pub fn grant(&self, module: Module) -> Grant {
        self.0.get(&module).copied().unwrap_or_default()
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.grant(module).allows(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Module, Grant)> + '_ {
        self.0.iter().map(|(m, g)| (*m, *g))
    }
}

/// One entry of a submitted permission matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionInput {
    pub module_code: String,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_edit: bool,
}

/// Validate a submitted matrix against the module registry and apply
/// edit-implies-view. Duplicate module codes are rejected.
pub fn normalize_matrix(input: &[PermissionInput]) -> Result<Vec<(Module, Grant)>, CoreError> {
    let mut seen = BTreeMap::new();
    for entry in input {
        let module = Module::parse(&entry.module_code).ok_or_else(|| {
            CoreError::Validation(format!("Unknown module code '{}'", entry.module_code))
        })?;
        let grant = Grant {
            can_view: entry.can_view,
            can_edit: entry.can_edit,
        }
        .normalized();
        if seen.insert(module, grant).is_some() {
            return Err(CoreError::Validation(format!(
                "Duplicate module code '{}'",
                entry.module_code
            )));
        }
    }
    Ok(seen.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// Scope of rows a caller may see and touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "region_id", rename_all = "snake_case")]
pub enum RegionScope {
    Global,
    Region(DbId),
}

impl RegionScope {
    pub fn region_id(self) -> Option<DbId> {
        match self {
            RegionScope::Global => None,
            RegionScope::Region(id) => Some(id),
        }
    }

    /// Whether a row in `region_id` is visible. Rows with no region are only
    /// visible to global callers.
    pub fn allows(self, region_id: Option<DbId>) -> bool {
        match self {
            RegionScope::Global => true,
            RegionScope::Region(id) => region_id == Some(id),
        }
    }

    pub fn ensure(self, region_id: Option<DbId>) -> Result<(), CoreError> {
        if self.allows(region_id) {
            Ok(())
        } else {
            Err(CoreError::forbidden())
        }
    }

    /// The region a create should land in: a scoped caller is pinned to its
    /// own region, a global caller keeps what it submitted.
    pub fn pin(self, requested: Option<DbId>) -> Result<Option<DbId>, CoreError> {
        match self {
            RegionScope::Global => Ok(requested),
            RegionScope::Region(id) => match requested {
                None => Ok(Some(id)),
                Some(r) if r == id => Ok(Some(id)),
                Some(_) => Err(CoreError::forbidden()),
            },
        }
    }
}

/// The calling actor as supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role_id: Option<DbId>,
    pub role: String,
    pub region_id: Option<DbId>,
    pub location_id: Option<DbId>,
}

impl Principal {
    pub fn is_super_admin(&self) -> bool {
        is_super_admin_name(&self.role)
    }

    pub fn scope(&self) -> RegionScope {
        if self.is_super_admin() {
            return RegionScope::Global;
        }
        match self.region_id {
            Some(id) => RegionScope::Region(id),
            None => RegionScope::Global,
        }
    }
}

/// A principal together with its resolved permissions for one request.
#[derive(Debug, Clone)]
pub struct Authorizer {
    pub principal: Principal,
    permissions: PermissionSet,
}

impl Authorizer {
    /// Super admins get the full matrix regardless of `permissions`.
    pub fn new(principal: Principal, permissions: PermissionSet) -> Self {
        let permissions = if principal.is_super_admin() {
            PermissionSet::full()
        } else {
            permissions
        };
        Self {
            principal,
            permissions,
        }
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn scope(&self) -> RegionScope {
        self.principal.scope()
    }

    pub fn can(&self, module: Module, action: Action) -> bool {
        self.principal.is_super_admin() || self.permissions.allows(module, action)
    }

    /// Allowed when any one of `modules` grants `action`.
    pub fn can_any(&self, modules: &[Module], action: Action) -> bool {
        modules.iter().any(|m| self.can(*m, action))
    }

    pub fn require(&self, module: Module, action: Action) -> Result<(), CoreError> {
        self.require_any(&[module], action)
    }

    pub fn require_any(&self, modules: &[Module], action: Action) -> Result<(), CoreError> {
        if self.can_any(modules, action) {
            Ok(())
        } else {
            Err(CoreError::forbidden())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
