use std::collections::BTreeMap;

use melt_core::{Database, DateVal, FieldValue};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::rules::MeltRule;

/// Outcome tally of one rule-application pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MeltStats {
    /// Characters visited by some rule, whether or not their culture moved.
    pub affected: u64,
    /// Characters whose culture actually changed and were marked dirty.
    pub rewritten: u64,
    /// Rule-affected cultures and how many rules mentioned each. A rule
    /// whose dynasty no parsed character uses contributes nothing.
    pub cultures: BTreeMap<String, usize>,
}

/// Applies every rule in file order. A character born strictly before
/// `cutoff` takes the rule's early culture, everyone else the later one;
/// only an actual change replaces the culture value (with a comment
/// recording the previous one) and marks the record dirty.
pub fn apply(db: &mut Database, melt_rules: &[MeltRule], cutoff: &DateVal) -> MeltStats {
    let mut stats = MeltStats::default();

    for rule in melt_rules {
        let ids = db.characters_by_dynasty(rule.dynasty).to_vec();
        if ids.is_empty() {
            // The dynasty exists in the rules, but no character uses it.
            continue;
        }

        *stats.cultures.entry(rule.early.clone()).or_insert(0) += 1;
        *stats.cultures.entry(rule.later.clone()).or_insert(0) += 1;

        for id in ids {
            stats.affected += 1;
            let character = db.character_mut(id);
            let target = if character.birth < *cutoff {
                &rule.early
            } else {
                &rule.later
            };
            if *target != character.culture.value {
                stats.rewritten += 1;
                debug!(
                    record = character.id,
                    from = %character.culture.value,
                    to = %target,
                    "melting culture"
                );
                character.culture = FieldValue::with_comment(
                    target.clone(),
                    format!("# melted from: {}", character.culture.value),
                );
                character.dirty = true;
            }
        }
    }

    stats
}

impl MeltStats {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.cultures.is_empty() {
            out.push_str("No cultures were rule-affected.\n");
        } else {
            out.push_str("Rule-affected cultures (does not imply rule had effects):\n");
            for (culture, count) in &self.cultures {
                out.push_str(&format!("  {culture} [{count} rules]\n"));
            }
        }
        out.push_str(&format!(
            "Characters theoretically affected: {}\n",
            self.affected
        ));
        out.push_str(&format!(
            "Characters actually rewritten: {}\n",
            self.rewritten
        ));
        out
    }

    pub fn to_json(&self) -> JsonValue {
        let mut cultures = JsonMap::new();
        for (culture, count) in &self.cultures {
            cultures.insert(culture.clone(), JsonValue::from(*count as u64));
        }

        let mut out = JsonMap::new();
        out.insert(
            "rule_affected_cultures".to_string(),
            JsonValue::Object(cultures),
        );
        out.insert(
            "characters_affected".to_string(),
            JsonValue::from(self.affected),
        );
        out.insert(
            "characters_rewritten".to_string(),
            JsonValue::from(self.rewritten),
        );
        JsonValue::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{MeltStats, apply};
    use crate::rules::MeltRule;
    use melt_core::{Database, DateVal};

    fn sample_db() -> Database {
        let mut db = Database::new();
        db.parse_source(
            "sample.txt",
            concat!(
                "1 = {\n",
                "\tname=\"Old\"\n",
                "\tdynasty=100\n",
                "\tculture=\"norse\"\n",
                "\t800.1.1 = {\n",
                "\t\tbirth=yes\n",
                "\t}\n",
                "}\n",
                "2 = {\n",
                "\tname=\"Young\"\n",
                "\tdynasty=100\n",
                "\tculture=\"norse\"\n",
                "\t1300.1.1 = {\n",
                "\t\tbirth=yes\n",
                "\t}\n",
                "}\n",
            ),
        )
        .expect("sample parses");
        db
    }

    fn rule(dynasty: u64, early: &str, later: &str) -> MeltRule {
        MeltRule {
            dynasty,
            early: early.to_string(),
            later: later.to_string(),
        }
    }

    #[test]
    fn cutoff_splits_early_and_later_cultures() {
        let mut db = sample_db();
        let stats = apply(
            &mut db,
            &[rule(100, "norse", "norwegian")],
            &DateVal::new(1000, 1, 1),
        );

        assert_eq!(stats.affected, 2);
        assert_eq!(stats.rewritten, 1);

        let old = db.lookup(1).expect("record 1 indexed");
        let young = db.lookup(2).expect("record 2 indexed");
        assert_eq!(db.character(old).culture.value, "norse");
        assert!(!db.character(old).dirty);
        assert_eq!(db.character(young).culture.value, "norwegian");
        assert_eq!(
            db.character(young).culture.comment.as_deref(),
            Some("# melted from: norse")
        );
        assert!(db.character(young).dirty);
    }

    #[test]
    fn unused_dynasty_contributes_nothing() {
        let mut db = sample_db();
        let stats = apply(
            &mut db,
            &[rule(999, "saxon", "german")],
            &DateVal::new(1000, 1, 1),
        );
        assert_eq!(stats, MeltStats::default());
    }

    #[test]
    fn culture_tally_counts_rules_per_culture() {
        let mut db = sample_db();
        let stats = apply(
            &mut db,
            &[
                rule(100, "norse", "norwegian"),
                rule(100, "norse", "danish"),
            ],
            &DateVal::new(1000, 1, 1),
        );
        assert_eq!(stats.cultures.get("norse"), Some(&2));
        assert_eq!(stats.cultures.get("norwegian"), Some(&1));
        assert_eq!(stats.cultures.get("danish"), Some(&1));
    }

    #[test]
    fn summary_text_lists_cultures_and_counters() {
        let mut db = sample_db();
        let stats = apply(
            &mut db,
            &[rule(100, "norse", "norwegian")],
            &DateVal::new(1000, 1, 1),
        );
        let text = stats.to_text();
        assert!(text.contains("  norse [1 rules]"));
        assert!(text.contains("Characters theoretically affected: 2"));
        assert!(text.contains("Characters actually rewritten: 1"));

        let json = stats.to_json();
        assert_eq!(json["characters_rewritten"], 1);
        assert_eq!(json["rule_affected_cultures"]["norse"], 1);
    }
}
