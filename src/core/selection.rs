//! Selection state: period, subject-or-average, and the fixed rosters.
//!
//! The selection is owned by the presentation layer and passed into the
//! aggregation core as a plain value; nothing here is retained between
//! requests.

use crate::dataset::types::{Sex, SexSelection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roster of tracked female subjects. Fixed for the process lifetime,
/// never derived from table headers.
pub const FEMALE_SUBJECTS: [&str; 13] = [
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "f13",
];

/// Roster of tracked male subjects.
pub const MALE_SUBJECTS: [&str; 13] = [
    "m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9", "m10", "m11", "m12", "m13",
];

/// Roster for one sex.
pub fn subjects_for(sex: Sex) -> &'static [&'static str] {
    match sex {
        Sex::Female => &FEMALE_SUBJECTS,
        Sex::Male => &MALE_SUBJECTS,
    }
}

/// Requested time span, in whole days from the start of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    OneDay,
    SevenDays,
    FourteenDays,
}

impl Period {
    pub fn days(self) -> usize {
        match self {
            Period::OneDay => 1,
            Period::SevenDays => 7,
            Period::FourteenDays => 14,
        }
    }

    pub fn minutes(self) -> usize {
        self.days() * crate::core::MINUTES_PER_DAY
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::OneDay => write!(f, "24h"),
            Period::SevenDays => write!(f, "7d"),
            Period::FourteenDays => write!(f, "14d"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    /// Accepts the dashboard tokens ("24h", "7d", "14d") and plain day
    /// counts ("1", "7", "14").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "1d" | "1" => Ok(Period::OneDay),
            "7d" | "7" => Ok(Period::SevenDays),
            "14d" | "14" => Ok(Period::FourteenDays),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// Subject dropdown selection: a specific subject or the cross-subject
/// average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectSelection {
    Average,
    Subject(String),
}

impl SubjectSelection {
    /// Aggregation mode implied by this selection.
    pub fn mode(&self) -> AggregationMode<'_> {
        match self {
            SubjectSelection::Average => AggregationMode::CrossSubjectAverage,
            SubjectSelection::Subject(id) => AggregationMode::PerSubject(id),
        }
    }

    /// Whether the selected subject exists in a roster covered by `sexes`.
    pub fn is_valid_for(&self, sexes: SexSelection) -> bool {
        match self {
            SubjectSelection::Average => true,
            SubjectSelection::Subject(id) => sexes
                .sexes()
                .iter()
                .any(|sex| subjects_for(*sex).contains(&id.as_str())),
        }
    }

    /// Sex owning the selected subject, when one is selected.
    pub fn subject_sex(&self) -> Option<Sex> {
        match self {
            SubjectSelection::Average => None,
            SubjectSelection::Subject(id) => {
                if FEMALE_SUBJECTS.contains(&id.as_str()) {
                    Some(Sex::Female)
                } else if MALE_SUBJECTS.contains(&id.as_str()) {
                    Some(Sex::Male)
                } else {
                    None
                }
            }
        }
    }

    /// Cross-sex continuity rule for the subject dropdown: when the sex
    /// changes, remap by numeric suffix (f4 becomes m4). Falls back to
    /// the average when the target roster has no matching id or the
    /// previous selection was already the average.
    pub fn remap(&self, sex: Sex) -> SubjectSelection {
        match self {
            SubjectSelection::Average => SubjectSelection::Average,
            SubjectSelection::Subject(id) => {
                let suffix = id.trim_start_matches(|c: char| c.is_ascii_alphabetic());
                let candidate = format!("{}{}", sex.prefix(), suffix);
                if subjects_for(sex).contains(&candidate.as_str()) {
                    SubjectSelection::Subject(candidate)
                } else {
                    SubjectSelection::Average
                }
            }
        }
    }
}

impl fmt::Display for SubjectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectSelection::Average => write!(f, "average"),
            SubjectSelection::Subject(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for SubjectSelection {
    type Err = String;

    /// Accepts "average" or a subject id. Roster membership is checked
    /// separately against the sex selection via [`Self::is_valid_for`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        if token.is_empty() {
            return Err("empty subject selection".to_string());
        }
        if token == "average" {
            Ok(SubjectSelection::Average)
        } else {
            Ok(SubjectSelection::Subject(token))
        }
    }
}

/// How aggregators reduce across subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode<'a> {
    /// Average over every subject in the roster.
    CrossSubjectAverage,
    /// Follow one subject only.
    PerSubject(&'a str),
}

/// The full selection tuple driving a recomputation.
#[derive(Debug, Clone)]
pub struct Selection {
    pub sex: SexSelection,
    pub period: Period,
    pub subject: SubjectSelection,
}

impl Selection {
    /// Concrete sexes to aggregate for this selection. With a specific
    /// subject selected, only the sex owning that subject applies.
    pub fn sexes(&self) -> Vec<Sex> {
        match self.subject.subject_sex() {
            Some(sex) => vec![sex],
            None => self.sex.sexes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rosters_are_fixed_and_disjoint() {
        assert_eq!(subjects_for(Sex::Female).len(), 13);
        assert_eq!(subjects_for(Sex::Male).len(), 13);
        for id in FEMALE_SUBJECTS {
            assert!(!MALE_SUBJECTS.contains(&id));
        }
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("24h".parse::<Period>().unwrap(), Period::OneDay);
        assert_eq!("7".parse::<Period>().unwrap(), Period::SevenDays);
        assert_eq!("14d".parse::<Period>().unwrap(), Period::FourteenDays);
        assert!("30d".parse::<Period>().is_err());

        assert_eq!(Period::SevenDays.minutes(), 7 * 1440);
    }

    #[test]
    fn test_remap_by_numeric_suffix() {
        let f4 = SubjectSelection::Subject("f4".to_string());
        assert_eq!(
            f4.remap(Sex::Male),
            SubjectSelection::Subject("m4".to_string())
        );
        // Same sex keeps the selection.
        assert_eq!(f4.remap(Sex::Female), f4);
    }

    #[test]
    fn test_remap_falls_back_to_average() {
        // No m99 in the roster.
        let stray = SubjectSelection::Subject("f99".to_string());
        assert_eq!(stray.remap(Sex::Male), SubjectSelection::Average);
        assert_eq!(
            SubjectSelection::Average.remap(Sex::Male),
            SubjectSelection::Average
        );
    }

    #[test]
    fn test_subject_validity() {
        let f3 = "f3".parse::<SubjectSelection>().unwrap();
        assert!(f3.is_valid_for(SexSelection::Female));
        assert!(f3.is_valid_for(SexSelection::All));
        assert!(!f3.is_valid_for(SexSelection::Male));
        assert_eq!(f3.subject_sex(), Some(Sex::Female));

        let avg = "average".parse::<SubjectSelection>().unwrap();
        assert!(avg.is_valid_for(SexSelection::Male));
        assert_eq!(avg.subject_sex(), None);
    }

    #[test]
    fn test_selection_sexes_follow_subject() {
        let selection = Selection {
            sex: SexSelection::All,
            period: Period::OneDay,
            subject: SubjectSelection::Subject("m2".to_string()),
        };
        assert_eq!(selection.sexes(), vec![Sex::Male]);

        let average = Selection {
            sex: SexSelection::All,
            period: Period::OneDay,
            subject: SubjectSelection::Average,
        };
        assert_eq!(average.sexes(), vec![Sex::Female, Sex::Male]);
    }
}
