//! Expected status for every operation, identity and validity class.
//!
//! Reads are open to any authenticated identity, writes need admin rights.
//! Anonymous requests are rejected with 401 before the body or id is looked at.

use crate::auth::Role;
use reqwest::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Resource {
    Artists,
    Albums,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Artists, Resource::Albums, Resource::Users];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Artists => "artists",
            Resource::Albums => "albums",
            Resource::Users => "users",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "artists" => Some(Resource::Artists),
            "albums" => Some(Resource::Albums),
            "users" => Some(Resource::Users),
            _ => None,
        }
    }

    pub fn operations(self) -> &'static [Operation] {
        match self {
            Resource::Artists | Resource::Albums => &[
                Operation::Create,
                Operation::List,
                Operation::Read,
                Operation::Update,
                Operation::Delete,
            ],
            Resource::Users => &[Operation::Register, Operation::ChangeRights],
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    List,
    Read,
    Update,
    Delete,
    Register,
    ChangeRights,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Register => "register",
            Operation::ChangeRights => "change_rights",
        }
    }

    /// Operations addressing a single record, where the id class matters.
    pub fn targets_record(self) -> bool {
        matches!(
            self,
            Operation::Read | Operation::Update | Operation::Delete | Operation::ChangeRights
        )
    }
}

/// Whether the request body (or query) is structurally valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub fn as_str(self) -> &'static str {
        match self {
            Validity::Valid => "valid",
            Validity::Invalid => "invalid",
        }
    }
}

/// Whether the addressed record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Existing,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Case {
    pub resource: Resource,
    pub operation: Operation,
    pub role: Role,
    pub data: Validity,
    pub target: Target,
}

impl Case {
    pub fn new(resource: Resource, operation: Operation, role: Role) -> Self {
        Self {
            resource,
            operation,
            role,
            data: Validity::Valid,
            target: Target::Existing,
        }
    }

    pub fn invalid(mut self) -> Self {
        self.data = Validity::Invalid;
        self
    }

    pub fn missing(mut self) -> Self {
        self.target = Target::Missing;
        self
    }

    /// Stable name, e.g. `albums::update_valid_missing_as_admin`.
    pub fn name(&self) -> String {
        let target = match self.target {
            Target::Existing => "",
            Target::Missing => "_missing",
        };
        format!(
            "{}::{}_{}{}_as_{}",
            self.resource,
            self.operation.as_str(),
            self.data.as_str(),
            target,
            self.role
        )
    }
}

/// A case paired with the status the server must answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub case: Case,
    pub expected: StatusCode,
}

impl Scenario {
    /// `None` when the contract has no row for the case.
    pub fn new(case: Case) -> Option<Self> {
        expected_status(&case).map(|expected| Self { case, expected })
    }

    pub fn name(&self) -> String {
        self.case.name()
    }
}

fn by_role(role: Role, user: StatusCode, admin: StatusCode) -> StatusCode {
    match role {
        Role::Anonymous => StatusCode::UNAUTHORIZED,
        Role::User => user,
        Role::Admin => admin,
    }
}

fn admin_only(role: Role, status: StatusCode) -> Option<StatusCode> {
    (role == Role::Admin).then_some(status)
}

fn crud_status(case: &Case) -> Option<StatusCode> {
    use Operation::*;
    use Target::*;
    use Validity::*;

    let role = case.role;
    match (case.operation, case.data, case.target) {
        (Create, Valid, Existing) => Some(by_role(role, StatusCode::FORBIDDEN, StatusCode::CREATED)),
        (Create, Invalid, Existing) => Some(by_role(
            role,
            StatusCode::FORBIDDEN,
            StatusCode::UNPROCESSABLE_ENTITY,
        )),
        (List, Valid, Existing) => Some(by_role(role, StatusCode::OK, StatusCode::OK)),
        (List, Invalid, Existing) => Some(by_role(
            role,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::UNPROCESSABLE_ENTITY,
        )),
        (Read, Valid, Existing) => Some(by_role(role, StatusCode::OK, StatusCode::OK)),
        (Read, Valid, Missing) => Some(by_role(role, StatusCode::NOT_FOUND, StatusCode::NOT_FOUND)),
        (Update, Valid, Existing) => Some(by_role(role, StatusCode::FORBIDDEN, StatusCode::OK)),
        (Update, Valid, Missing) => admin_only(role, StatusCode::NOT_FOUND),
        (Update, Invalid, Existing) => admin_only(role, StatusCode::UNPROCESSABLE_ENTITY),
        (Delete, Valid, Existing) => Some(by_role(
            role,
            StatusCode::FORBIDDEN,
            StatusCode::NO_CONTENT,
        )),
        (Delete, Valid, Missing) => admin_only(role, StatusCode::NOT_FOUND),
        _ => None,
    }
}

fn users_status(case: &Case) -> Option<StatusCode> {
    use Operation::*;
    use Target::*;
    use Validity::*;

    let role = case.role;
    match (case.operation, case.data, case.target) {
        // Registration is the only anonymous write and answers 200, not 201.
        (Register, Valid, Existing) => (role == Role::Anonymous).then_some(StatusCode::OK),
        (Register, Invalid, Existing) => {
            (role == Role::Anonymous).then_some(StatusCode::UNPROCESSABLE_ENTITY)
        }
        (ChangeRights, Valid, Existing) => {
            Some(by_role(role, StatusCode::FORBIDDEN, StatusCode::OK))
        }
        (ChangeRights, Invalid, Existing) => admin_only(role, StatusCode::UNPROCESSABLE_ENTITY),
        (ChangeRights, Valid, Missing) => admin_only(role, StatusCode::NOT_FOUND),
        _ => None,
    }
}

pub fn expected_status(case: &Case) -> Option<StatusCode> {
    if !case.resource.operations().contains(&case.operation) {
        return None;
    }
    if case.target == Target::Missing && !case.operation.targets_record() {
        return None;
    }
    match case.resource {
        Resource::Artists | Resource::Albums => crud_status(case),
        Resource::Users => users_status(case),
    }
}

/// Every scenario of a resource in run order: operation, then validity,
/// then target, then anonymous, user, admin.
pub fn scenarios(resource: Resource) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for &operation in resource.operations() {
        for data in [Validity::Valid, Validity::Invalid] {
            for target in [Target::Existing, Target::Missing] {
                for role in Role::ALL {
                    let case = Case {
                        resource,
                        operation,
                        role,
                        data,
                        target,
                    };
                    scenarios.extend(Scenario::new(case));
                }
            }
        }
    }
    scenarios
}
