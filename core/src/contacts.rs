//! Emergency contact directory.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Other,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyContact {
    pub id: &'static str,
    pub name: &'static str,
    pub phone: &'static str,
}

impl EmergencyContact {
    /// URI that starts a call. iOS uses `telprompt:` so the user confirms first.
    #[must_use]
    pub fn dial_uri(&self, platform: Platform) -> String {
        match platform {
            Platform::Ios => format!("telprompt:{}", self.phone),
            Platform::Other => format!("tel:{}", self.phone),
        }
    }
}

pub const DEFAULT_CONTACTS: &[EmergencyContact] = &[
    EmergencyContact {
        id: "1",
        name: "Primary Caregiver",
        phone: "647-679-6931",
    },
    EmergencyContact {
        id: "2",
        name: "Jane Smith",
        phone: "987-654-3210",
    },
    EmergencyContact {
        id: "3",
        name: "Alice Johnson",
        phone: "555-0123-4567",
    },
    EmergencyContact {
        id: "4",
        name: "Bob Wilson",
        phone: "444-000-3333",
    },
];

#[cfg(test)]
mod tests {
    use super::{DEFAULT_CONTACTS, Platform};

    #[test]
    fn dial_uri_per_platform() {
        let caregiver = DEFAULT_CONTACTS[0];
        assert_eq!(caregiver.dial_uri(Platform::Ios), "telprompt:647-679-6931");
        assert_eq!(caregiver.dial_uri(Platform::Other), "tel:647-679-6931");
    }

    #[test]
    fn directory_is_ordered_by_id() {
        let ids: Vec<&str> = DEFAULT_CONTACTS.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
