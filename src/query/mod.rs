//! Record lookup by field criteria.
//!
//! A [`Criteria`] is an ordered set of field comparisons that identifies the
//! zero-or-one record behind a semantic key such as "content name + version".
//! [`build_query`] turns it into a [`ListQuery`] whose condition is a binary
//! `And` tree folded left to right, the shape the site's CAML queries use.

use crate::lists::field;
use crate::store::{Fields, ListItem, ListStore, StoreError};
use std::fmt;
use tracing::debug;

/// Comparison applied to a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
}

impl Operator {
    fn caml_tag(&self) -> &'static str {
        match self {
            Operator::Equals => "Eq",
            Operator::NotEquals => "Neq",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl Predicate {
    /// A field missing from the item compares as the empty string.
    pub fn matches(&self, fields: &Fields) -> bool {
        let actual = fields.get(&self.field).map(String::as_str).unwrap_or("");
        match self.operator {
            Operator::Equals => actual == self.value,
            Operator::NotEquals => actual != self.value,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'{}'{}'", self.field, self.operator.symbol(), self.value)
    }
}

/// Field comparisons that must all hold.
///
/// Behaves like a mapping from field name to comparison: setting a field a
/// second time replaces the earlier comparison in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    predicates: Vec<Predicate>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(self, field: &str, value: impl Into<String>) -> Self {
        self.with(field, Operator::Equals, value)
    }

    pub fn not_equals(self, field: &str, value: impl Into<String>) -> Self {
        self.with(field, Operator::NotEquals, value)
    }

    pub fn with(mut self, field: &str, operator: Operator, value: impl Into<String>) -> Self {
        let predicate = Predicate {
            field: field.to_string(),
            operator,
            value: value.into(),
        };
        match self.predicates.iter_mut().find(|p| p.field == field) {
            Some(existing) => *existing = predicate,
            None => self.predicates.push(predicate),
        }
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Value of the first comparison, which is the key the criteria locate.
    /// Used to name the record in log lines.
    pub fn subject(&self) -> &str {
        self.predicates
            .first()
            .map(|p| p.value.as_str())
            .unwrap_or("")
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", predicate)?;
        }
        Ok(())
    }
}

/// Boolean condition tree evaluated by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Matches every item; produced by empty criteria
    All,
    Compare(Predicate),
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Condition::All => true,
            Condition::Compare(predicate) => predicate.matches(fields),
            Condition::And(left, right) => left.matches(fields) && right.matches(fields),
        }
    }

    /// Render as a CAML `<Where>` clause.
    pub fn to_caml(&self) -> String {
        match self {
            Condition::All => "<Where />".to_string(),
            _ => format!("<Where>{}</Where>", self.caml_node()),
        }
    }

    fn caml_node(&self) -> String {
        match self {
            Condition::All => String::new(),
            Condition::Compare(p) => format!(
                "<{tag}><FieldRef Name='{field}' /><Value Type='Text'>{value}</Value></{tag}>",
                tag = p.operator.caml_tag(),
                field = escape_xml(&p.field),
                value = escape_xml(&p.value),
            ),
            Condition::And(left, right) => {
                format!("<And>{}{}</And>", left.caml_node(), right.caml_node())
            }
        }
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A built query: fields to fetch and the condition items must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Always starts with the record identifier
    pub fields: Vec<String>,
    pub condition: Condition,
}

impl ListQuery {
    pub fn matches(&self, fields: &Fields) -> bool {
        self.condition.matches(fields)
    }
}

/// Build the query for a set of criteria.
///
/// `((c1 AND c2) AND c3) ...` - each criterion is joined to everything before
/// it, so any number of criteria keeps strict AND semantics.
pub fn build_query(criteria: &Criteria) -> ListQuery {
    let mut fields = vec![field::ID.to_string()];
    let mut condition: Option<Condition> = None;

    for predicate in criteria.predicates() {
        fields.push(predicate.field.clone());
        let leaf = Condition::Compare(predicate.clone());
        condition = Some(match condition {
            None => leaf,
            Some(tree) => Condition::And(Box::new(tree), Box::new(leaf)),
        });
    }

    ListQuery {
        fields,
        condition: condition.unwrap_or(Condition::All),
    }
}

/// Items of `list` matching `criteria`.
pub async fn find<S>(store: &S, list: &str, criteria: &Criteria) -> Result<Vec<ListItem>, StoreError>
where
    S: ListStore + ?Sized,
{
    let query = build_query(criteria);
    debug!(list = %list, query = %query.condition.to_caml(), "Querying list");
    store.query(list, &query).await
}

/// True iff at least one item of `list` matches `criteria`.
pub async fn exists<S>(store: &S, list: &str, criteria: &Criteria) -> Result<bool, StoreError>
where
    S: ListStore + ?Sized,
{
    Ok(!find(store, list, criteria).await?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn three_criteria() -> Criteria {
        Criteria::new()
            .equals("Final Content Name", "Foo")
            .equals("Release Completed", "No")
            .not_equals("Status", "Obsolete")
    }

    #[test]
    fn test_fields_start_with_id() {
        let query = build_query(&three_criteria());
        assert_eq!(
            query.fields,
            vec!["ID", "Final Content Name", "Release Completed", "Status"]
        );
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let query = build_query(&Criteria::new());
        assert_eq!(query.fields, vec!["ID"]);
        assert_eq!(query.condition, Condition::All);
        assert!(query.matches(&record(&[("Status", "Done")])));
    }

    #[test]
    fn test_single_criterion_is_a_leaf() {
        let query = build_query(&Criteria::new().equals("Title", "Foo"));
        assert!(matches!(query.condition, Condition::Compare(_)));
    }

    #[test]
    fn test_tree_folds_left_to_right() {
        let query = build_query(&three_criteria());
        let Condition::And(left, right) = &query.condition else {
            panic!("expected And at the root");
        };
        assert!(matches!(**left, Condition::And(_, _)));
        let Condition::Compare(last) = &**right else {
            panic!("expected the last criterion on the right");
        };
        assert_eq!(last.field, "Status");
    }

    #[test]
    fn test_conjunction_matches_record_meeting_all_criteria() {
        let query = build_query(&three_criteria());
        let item = record(&[
            ("Final Content Name", "Foo"),
            ("Release Completed", "No"),
            ("Status", "In progress"),
        ]);
        assert!(query.matches(&item));
    }

    #[test]
    fn test_conjunction_rejects_record_differing_in_any_criterion() {
        let query = build_query(&three_criteria());
        let matching = [
            ("Final Content Name", "Foo"),
            ("Release Completed", "No"),
            ("Status", "In progress"),
        ];
        let breaking = [
            ("Final Content Name", "Bar"),
            ("Release Completed", "Yes"),
            ("Status", "Obsolete"),
        ];
        for i in 0..matching.len() {
            let mut pairs = matching.to_vec();
            pairs[i] = breaking[i];
            assert!(!query.matches(&record(&pairs)), "criterion {} should fail", i);
        }
    }

    #[test]
    fn test_missing_field_compares_as_empty() {
        let eq = build_query(&Criteria::new().equals("Status", "Done"));
        let neq = build_query(&Criteria::new().not_equals("Status", "Obsolete"));
        let item = record(&[("Title", "Foo")]);
        assert!(!eq.matches(&item));
        assert!(neq.matches(&item));
    }

    #[test]
    fn test_setting_field_twice_replaces_in_place() {
        let criteria = Criteria::new()
            .equals("A", "1")
            .equals("B", "2")
            .not_equals("A", "3");
        assert_eq!(criteria.predicates().len(), 2);
        assert_eq!(criteria.predicates()[0].operator, Operator::NotEquals);
        assert_eq!(criteria.predicates()[0].value, "3");
        assert_eq!(criteria.subject(), "3");
    }

    #[test]
    fn test_caml_rendering() {
        let query = build_query(&Criteria::new().equals("Title", "A & B").not_equals("Status", "Done"));
        assert_eq!(
            query.condition.to_caml(),
            "<Where><And>\
             <Eq><FieldRef Name='Title' /><Value Type='Text'>A &amp; B</Value></Eq>\
             <Neq><FieldRef Name='Status' /><Value Type='Text'>Done</Value></Neq>\
             </And></Where>"
        );
    }

    #[test]
    fn test_criteria_display() {
        assert_eq!(
            Criteria::new().equals("Title", "Foo").not_equals("Status", "Done").to_string(),
            "'Title'='Foo' AND 'Status'!='Done'"
        );
    }
}
