//! Passphrase strength policy for keystore encryption.
//!
//! The policy is one ordered rule table. [`PassphrasePolicy::is_valid`] and the
//! human readable rule list shown to users are both read from that table, so
//! the check and its description cannot drift apart. The minimum length and
//! the special-character set are written once, in the macros below, and
//! spliced into both the predicates and the descriptions.

use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumIter;

macro_rules! min_passphrase_length {
    () => {
        15
    };
}

macro_rules! special_characters {
    () => {
        "*.!@#$%^&()_=+<>-"
    };
}

/// minimum number of characters (unicode scalar values) in a passphrase
pub const MIN_PASSPHRASE_LENGTH: usize = min_passphrase_length!();

/// characters that satisfy the special-character rule
pub const SPECIAL_CHARACTERS: &str = special_characters!();

/// Advisory text carried alongside the rules. It is never enforced.
pub const GUIDANCE: &str =
    "Use a passphrase instead of a password. Start each word with a capital letter.";

/// identifies a single rule of the passphrase policy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum PassphraseRuleKind {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    SpecialCharacter,
}

/// one row of the rule table: what the rule is called, what users are told,
/// and how it is checked.
#[derive(Clone, Copy)]
pub struct PassphraseRule {
    kind: PassphraseRuleKind,
    description: &'static str,
    check: fn(&str) -> bool,
}

impl std::fmt::Debug for PassphraseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseRule")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish()
    }
}

impl PassphraseRule {
    pub fn kind(&self) -> PassphraseRuleKind {
        self.kind
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn is_satisfied_by(&self, passphrase: &str) -> bool {
        (self.check)(passphrase)
    }
}

const RULES: [PassphraseRule; 5] = [
    PassphraseRule {
        kind: PassphraseRuleKind::MinLength,
        description: concat!("Use minimum ", min_passphrase_length!(), " characters."),
        check: |p| p.chars().count() >= MIN_PASSPHRASE_LENGTH,
    },
    PassphraseRule {
        kind: PassphraseRuleKind::Uppercase,
        description: "Minimum 1 uppercase letter.",
        check: |p| p.chars().any(char::is_uppercase),
    },
    PassphraseRule {
        kind: PassphraseRuleKind::Lowercase,
        description: "Minimum 1 lowercase letter.",
        check: |p| p.chars().any(char::is_lowercase),
    },
    PassphraseRule {
        kind: PassphraseRuleKind::Digit,
        description: "Minimum 1 digit.",
        check: |p| p.chars().any(|c| c.is_ascii_digit()),
    },
    PassphraseRule {
        kind: PassphraseRuleKind::SpecialCharacter,
        description: concat!(
            "Minimum 1 special character, one of ",
            special_characters!(),
            "."
        ),
        check: |p| p.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
    },
];

/// Decides whether a passphrase is strong enough to protect key material.
///
/// Stateless; every method is an associated function.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassphrasePolicy;

impl PassphrasePolicy {
    /// true iff every rule in the table holds. Never fails.
    pub fn is_valid(passphrase: &str) -> bool {
        RULES.iter().all(|rule| rule.is_satisfied_by(passphrase))
    }

    /// the rule table, in display order
    pub fn rules() -> &'static [PassphraseRule] {
        &RULES
    }

    /// human readable rule descriptions, in display order
    pub fn descriptions() -> impl Iterator<Item = &'static str> {
        RULES.iter().map(PassphraseRule::description)
    }

    /// the rules `passphrase` fails. empty iff [`Self::is_valid`].
    pub fn unmet_rules(passphrase: &str) -> Vec<PassphraseRuleKind> {
        RULES
            .iter()
            .filter(|rule| !rule.is_satisfied_by(passphrase))
            .map(PassphraseRule::kind)
            .collect()
    }

    /// all descriptions joined into one sentence list, for error messages.
    pub fn summary() -> String {
        Self::descriptions().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::prop_assert;
    use proptest::prop_assert_eq;
    use strum::IntoEnumIterator;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn reference_passphrase_is_valid() {
        assert!(PassphrasePolicy::is_valid("HelloWorldFrom_me_1987@"));
        assert!(PassphrasePolicy::unmet_rules("HelloWorldFrom_me_1987@").is_empty());
    }

    #[test]
    fn empty_passphrase_fails_every_rule() {
        assert!(!PassphrasePolicy::is_valid(""));
        assert_eq!(
            PassphraseRuleKind::iter().collect::<Vec<_>>(),
            PassphrasePolicy::unmet_rules("")
        );
    }

    #[test]
    fn each_missing_class_is_reported() {
        let cases = [
            ("helloworldfrom_me_1987@", PassphraseRuleKind::Uppercase),
            ("HELLOWORLDFROM_ME_1987@", PassphraseRuleKind::Lowercase),
            ("HelloWorldFrom_me_abcd@", PassphraseRuleKind::Digit),
            ("HelloWorldFromMe1987abcd", PassphraseRuleKind::SpecialCharacter),
            ("Hello_World_1", PassphraseRuleKind::MinLength),
        ];
        for (passphrase, missing) in cases {
            assert!(!PassphrasePolicy::is_valid(passphrase), "{passphrase}");
            assert_eq!(vec![missing], PassphrasePolicy::unmet_rules(passphrase));
        }
    }

    #[test]
    fn every_special_character_counts() {
        for c in SPECIAL_CHARACTERS.chars() {
            let passphrase = format!("HelloWorldFromMe1987{c}");
            assert!(PassphrasePolicy::is_valid(&passphrase), "{passphrase}");
        }
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 14 characters, well over 15 bytes
        let passphrase = "Äöüßéèàç1@aaaa";
        assert_eq!(14, passphrase.chars().count());
        assert!(passphrase.len() > MIN_PASSPHRASE_LENGTH);
        assert_eq!(
            vec![PassphraseRuleKind::MinLength],
            PassphrasePolicy::unmet_rules(passphrase)
        );
    }

    #[test]
    fn descriptions_cover_every_rule_in_order() {
        let kinds = PassphrasePolicy::rules()
            .iter()
            .map(PassphraseRule::kind)
            .collect::<Vec<_>>();
        assert_eq!(PassphraseRuleKind::iter().collect::<Vec<_>>(), kinds);
        assert_eq!(5, PassphrasePolicy::descriptions().count());
    }

    #[test]
    fn descriptions_quote_the_checked_constants() {
        let descriptions = PassphrasePolicy::descriptions().collect::<Vec<_>>();
        assert!(descriptions[0].contains(&MIN_PASSPHRASE_LENGTH.to_string()));
        assert!(descriptions[4].contains(SPECIAL_CHARACTERS));
    }

    #[test]
    fn guidance_is_not_a_rule() {
        assert!(PassphrasePolicy::descriptions().all(|d| d != GUIDANCE));
    }

    #[proptest]
    fn short_passphrases_are_never_valid(#[strategy("\\PC{0,14}")] passphrase: String) {
        prop_assert!(passphrase.chars().count() < MIN_PASSPHRASE_LENGTH);
        prop_assert!(!PassphrasePolicy::is_valid(&passphrase));
    }

    #[proptest]
    fn passphrases_with_all_classes_are_valid(
        #[strategy("[A-Z]{1,4}")] upper: String,
        #[strategy("[a-z]{10,20}")] lower: String,
        #[strategy("[0-9]{1,3}")] digits: String,
        #[strategy("[*.!@#$%^&()_=+<>-]{1,2}")] special: String,
    ) {
        let passphrase = format!("{upper}{lower}{digits}{special}");
        prop_assert!(PassphrasePolicy::is_valid(&passphrase));
    }

    #[proptest]
    fn unmet_rules_agree_with_is_valid(passphrase: String) {
        prop_assert_eq!(
            PassphrasePolicy::is_valid(&passphrase),
            PassphrasePolicy::unmet_rules(&passphrase).is_empty()
        );
    }
}
