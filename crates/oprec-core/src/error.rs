//! Error types for `oprec-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("division {division_id} does not belong to department {department_id}")]
  DivisionNotInDepartment {
    division_id:   Uuid,
    department_id: Uuid,
  },

  #[error("sub-division {sub_division_id} does not belong to division {division_id}")]
  SubDivisionNotInDivision {
    sub_division_id: Uuid,
    division_id:     Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
