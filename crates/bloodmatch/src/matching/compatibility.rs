//! ABO/Rh transfusion compatibility table.

use crate::records::BloodGroup::{self, AbNeg, AbPos, ANeg, APos, BNeg, BPos, ONeg, OPos};

const FOR_A_POS: &[BloodGroup] = &[APos, ANeg, OPos, ONeg];
const FOR_A_NEG: &[BloodGroup] = &[ANeg, ONeg];
const FOR_B_POS: &[BloodGroup] = &[BPos, BNeg, OPos, ONeg];
const FOR_B_NEG: &[BloodGroup] = &[BNeg, ONeg];
const FOR_AB_POS: &[BloodGroup] = &[APos, ANeg, BPos, BNeg, AbPos, AbNeg, OPos, ONeg];
const FOR_AB_NEG: &[BloodGroup] = &[ANeg, BNeg, AbNeg, ONeg];
const FOR_O_POS: &[BloodGroup] = &[OPos, ONeg];
const FOR_O_NEG: &[BloodGroup] = &[ONeg];

/// Donor groups that may supply a recipient of the given group.
#[must_use]
pub fn donors_for(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        APos => FOR_A_POS,
        ANeg => FOR_A_NEG,
        BPos => FOR_B_POS,
        BNeg => FOR_B_NEG,
        AbPos => FOR_AB_POS,
        AbNeg => FOR_AB_NEG,
        OPos => FOR_O_POS,
        ONeg => FOR_O_NEG,
    }
}

/// Donor groups compatible with a requested group label.
///
/// Returns an empty slice when the label is not one of the eight canonical
/// groups, which callers treat as "no compatibility rule" rather than a
/// failure.
#[must_use]
pub fn compatible_donor_groups(requested: &str) -> &'static [BloodGroup] {
    match requested.parse::<BloodGroup>() {
        Ok(group) => donors_for(group),
        Err(_) => &[],
    }
}

/// Whether blood from `donor` may be given to `recipient`.
#[must_use]
pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> bool {
    donors_for(recipient).contains(&donor)
}
