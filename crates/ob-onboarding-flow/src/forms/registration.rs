//! Account registration block.
//!
//! The Investor Profile carries the four registration fields at the top of
//! step 1; SFC, BAIODF and BAIV nest them (plus `jointAccount`) under
//! `accountRegistration`. Downstream forms are prefilled from a completed
//! Investor Profile.

use ob_onboarding_types::{FieldErrors, FieldPath};
use serde_json::{json, Map, Value};

use crate::checks;
use crate::document::Doc;
use crate::forms::investor_profile::account::PrimaryType;
use crate::options::{OptionKey, YesNo};
use crate::prefill::{self, PrefillSources};

/// Block key used by every form except the Investor Profile.
pub const BLOCK: &str = "accountRegistration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    RrName,
    RrNo,
    CustomerNames,
    AccountNo,
    JointAccount,
}

impl RegistrationField {
    /// Required text fields, shared with the Investor Profile.
    pub const TEXT: [RegistrationField; 4] = [
        RegistrationField::RrName,
        RegistrationField::RrNo,
        RegistrationField::CustomerNames,
        RegistrationField::AccountNo,
    ];

    pub const ALL: [RegistrationField; 5] = [
        RegistrationField::RrName,
        RegistrationField::RrNo,
        RegistrationField::CustomerNames,
        RegistrationField::AccountNo,
        RegistrationField::JointAccount,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RegistrationField::RrName => "rrName",
            RegistrationField::RrNo => "rrNo",
            RegistrationField::CustomerNames => "customerNames",
            RegistrationField::AccountNo => "accountNo",
            RegistrationField::JointAccount => "jointAccount",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationField::RrName => "RR Name",
            RegistrationField::RrNo => "RR No.",
            RegistrationField::CustomerNames => "Customer name(s)",
            RegistrationField::AccountNo => "Account number",
            RegistrationField::JointAccount => "Joint account",
        }
    }

    /// Dotted path under `prefix` (`""` for top-level).
    pub fn dotted(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.key().to_string()
        } else {
            format!("{prefix}.{}", self.key())
        }
    }

    pub fn path(&self, prefix: &str) -> FieldPath {
        FieldPath::parse(&self.dotted(prefix))
    }

    pub fn validate(&self, doc: Doc<'_>, prefix: &str, errors: &mut FieldErrors) {
        let dotted = self.dotted(prefix);
        match self {
            RegistrationField::JointAccount => {
                checks::exactly_one::<YesNo>(doc, &dotted, "joint account answer", errors);
            }
            _ => {
                checks::required_text(doc, &dotted, self.label(), errors);
            }
        }
    }
}

/// Top-level registration defaults of the Investor Profile step 1.
pub fn text_defaults() -> Map<String, Value> {
    RegistrationField::TEXT
        .iter()
        .map(|f| (f.key().to_string(), json!("")))
        .collect()
}

/// `accountRegistration` block defaults.
pub fn block_defaults() -> Value {
    let mut block = text_defaults();
    block.insert(
        RegistrationField::JointAccount.key().to_string(),
        YesNo::empty_map(),
    );
    Value::Object(block)
}

/// Copy the Investor Profile registration into a still-empty
/// `accountRegistration` block.
pub fn prefill(fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
    let Some(profile) = sources.investor_profile_step1() else {
        return Vec::new();
    };
    let target = Doc::new(fields);
    let mut writes = Vec::new();

    for field in RegistrationField::TEXT {
        let source = profile.text(field.key());
        if !source.is_empty() && !target.has_text(&field.dotted(BLOCK)) {
            writes.push((field.path(BLOCK), json!(source)));
        }
    }

    let joint = RegistrationField::JointAccount.dotted(BLOCK);
    if target.selection::<YesNo>(&joint).is_empty() {
        if let Some(primary) = profile.choice::<PrimaryType>("typeOfAccount.primaryType") {
            let answer = if primary.is_joint() { YesNo::Yes } else { YesNo::No };
            writes.push((FieldPath::parse(&joint), answer.selected_map()));
        }
    }

    if !writes.is_empty() {
        prefill::trace_writes("accountRegistration", &writes);
    }
    writes
}

/// `accountRegistration.jointAccount == yes` in a step-1 document.
pub fn is_joint_account(step1: Doc<'_>) -> bool {
    step1.choice::<YesNo>(&RegistrationField::JointAccount.dotted(BLOCK)) == Some(YesNo::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_defaults_shape() {
        let block = block_defaults();
        assert_eq!(block["rrName"], "");
        assert_eq!(block["jointAccount"], json!({"yes": false, "no": false}));
    }

    #[test]
    fn test_required_text_and_joint_choice() {
        let fields = json!({"accountRegistration": {
            "rrName": " ", "rrNo": "R1", "customerNames": "Jane", "accountNo": "A1",
            "jointAccount": {"yes": false, "no": false}
        }});
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        for field in RegistrationField::ALL {
            field.validate(doc, BLOCK, &mut errors);
        }
        assert_eq!(errors.message("accountRegistration.rrName"), Some("RR Name is required"));
        assert!(errors
            .message("accountRegistration.jointAccount")
            .unwrap()
            .contains("exactly one"));
        assert_eq!(errors.len(), 2);
    }
}
