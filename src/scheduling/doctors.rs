//! Static doctor roster
//!
//! The roster is compiled in and never mutated; slot state for the
//! externally-integrated doctor lives entirely upstream.

use serde::Serialize;

/// A doctor patients can be booked with
#[derive(Debug, Clone, Serialize)]
pub struct Doctor {
    /// Upstream identifier; not part of the tool-facing rendering
    #[serde(skip)]
    pub id: u32,
    /// Display name
    pub name: &'static str,
    /// Medical specialty
    pub specialty: &'static str,
}

const ROSTER: &[Doctor] = &[
    Doctor {
        id: 8,
        name: "Dr. Ali",
        specialty: "Cardiologist",
    },
    Doctor {
        id: 9,
        name: "Dr. Bilal",
        specialty: "Dentist",
    },
    Doctor {
        id: 10,
        name: "Dr. Mehar",
        specialty: "Dermatologist",
    },
    Doctor {
        id: 11,
        name: "Dr. Rana",
        specialty: "Neurologist",
    },
];

/// All doctors the assistant may suggest
#[must_use]
pub const fn roster() -> &'static [Doctor] {
    ROSTER
}

/// Look up a doctor by display name (case-insensitive)
#[must_use]
pub fn find(name: &str) -> Option<&'static Doctor> {
    ROSTER.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// JSON rendering returned by the `show_available_doctors` tool:
/// an array of `{name, specialty}` objects
#[must_use]
pub fn roster_json() -> String {
    serde_json::to_string_pretty(ROSTER).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_json_hides_ids() {
        let rendered = roster_json();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let doctors = parsed.as_array().unwrap();
        assert_eq!(doctors.len(), 4);
        assert_eq!(doctors[0]["name"], "Dr. Ali");
        assert_eq!(doctors[0]["specialty"], "Cardiologist");
        assert!(doctors[0].get("id").is_none());
    }

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find("dr. bilal").map(|d| d.id), Some(9));
        assert!(find("Dr. Nobody").is_none());
    }
}
