use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' may not perform this operation")]
    Forbidden { role: Role },
}

/// Allow the principal if its role is one of `allowed`.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrincipalId;

    #[test]
    fn role_must_be_listed() {
        let employee = Principal::new(PrincipalId::new(), Role::Employee);

        assert!(authorize(&employee, &[Role::Employee, Role::Moderator]).is_ok());
        assert_eq!(
            authorize(&employee, &[Role::Moderator]),
            Err(AuthzError::Forbidden {
                role: Role::Employee
            })
        );
        assert!(authorize(&employee, &[]).is_err());
    }
}
