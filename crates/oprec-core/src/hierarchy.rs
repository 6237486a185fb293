//! The department → division → sub-division containment tree applicants
//! select into.
//!
//! The catalog itself is reference data; the only domain logic here is the
//! containment check applied when a profile changes its selection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
  pub department_id: Uuid,
  pub name:          String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
  pub division_id:   Uuid,
  pub department_id: Uuid,
  pub name:          String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubDivision {
  pub sub_division_id: Uuid,
  pub division_id:     Uuid,
  pub name:            String,
}

/// Validate the containment of a (possibly partial) selection.
///
/// `division` and `sub_division` are the fetched records for the ids on the
/// merged profile; callers pass `None` for unset fields. Fails when a
/// division's parent department disagrees with the selected department, or
/// a sub-division's parent division disagrees with the selected division.
pub fn check_containment(
  department_id: Option<Uuid>,
  division:      Option<&Division>,
  sub_division:  Option<&SubDivision>,
) -> Result<()> {
  if let (Some(department_id), Some(division)) = (department_id, division)
    && division.department_id != department_id
  {
    return Err(Error::DivisionNotInDepartment {
      division_id: division.division_id,
      department_id,
    });
  }

  if let (Some(division), Some(sub_division)) = (division, sub_division)
    && sub_division.division_id != division.division_id
  {
    return Err(Error::SubDivisionNotInDivision {
      sub_division_id: sub_division.sub_division_id,
      division_id:     division.division_id,
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tree() -> (Department, Division, SubDivision) {
    let department = Department {
      department_id: Uuid::new_v4(),
      name:          "Operations".into(),
    };
    let division = Division {
      division_id:   Uuid::new_v4(),
      department_id: department.department_id,
      name:          "Programming".into(),
    };
    let sub_division = SubDivision {
      sub_division_id: Uuid::new_v4(),
      division_id:     division.division_id,
      name:            "Web Programming".into(),
    };
    (department, division, sub_division)
  }

  #[test]
  fn full_matching_selection_passes() {
    let (dept, div, sub) = tree();
    check_containment(Some(dept.department_id), Some(&div), Some(&sub))
      .unwrap();
  }

  #[test]
  fn division_from_sibling_department_fails() {
    let (_dept, div, _sub) = tree();
    let other_department = Uuid::new_v4();

    let err = check_containment(Some(other_department), Some(&div), None)
      .unwrap_err();
    assert!(matches!(err, Error::DivisionNotInDepartment { .. }));
  }

  #[test]
  fn sub_division_from_sibling_division_fails() {
    let (dept, div, _sub) = tree();
    let foreign_sub = SubDivision {
      sub_division_id: Uuid::new_v4(),
      division_id:     Uuid::new_v4(),
      name:            "Network".into(),
    };

    let err =
      check_containment(Some(dept.department_id), Some(&div), Some(&foreign_sub))
        .unwrap_err();
    assert!(matches!(err, Error::SubDivisionNotInDivision { .. }));
  }

  #[test]
  fn partial_selection_checks_only_present_pairs() {
    let (_dept, _div, sub) = tree();
    // Sub-division without a division on the profile: nothing to compare.
    check_containment(None, None, Some(&sub)).unwrap();
  }
}
