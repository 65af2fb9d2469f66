//! Conformance test fixture runner
//!
//! Loads YAML fixtures, builds the matcher tree they describe, and checks
//! each case and the rendered description.
//!
//! # Tree layout
//!
//! Composites borrow their operands, so the tree lives in a slot arena: one
//! slot per declared leaf, then one slot per composite in post-order. Every
//! composite borrows only earlier slots. Children are combined through
//! [`try_and`] / [`try_or`], so a child that is itself a stored composite of
//! the same kind is refused exactly as it would be in user code.

use crate::{
    Between, Contains, EndsWith, Equals, GreaterThan, LessThan, MatchesRegex, StartsWith,
    TestValue,
};
use matchkit::prelude::*;
use serde::Deserialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub leaves: BTreeMap<String, LeafConfig>,
    pub expr: ExprConfig,
    /// Expected `description()` of the root matcher.
    #[serde(default)]
    pub expect_description: Option<String>,
    /// Expected build error code (see [`FixtureError::code`]).
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Leaf configuration
/// Uses untagged deserialization: each variant has one distinct key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LeafConfig {
    Equals(EqualsLeaf),
    GreaterThan(GreaterThanLeaf),
    LessThan(LessThanLeaf),
    Between(BetweenLeaf),
    Contains(ContainsLeaf),
    StartsWith(StartsWithLeaf),
    EndsWith(EndsWithLeaf),
    MatchesRegex(MatchesRegexLeaf),
}

#[derive(Debug, Clone, Deserialize)]
pub struct EqualsLeaf {
    pub equals: ValueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GreaterThanLeaf {
    pub greater_than: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LessThanLeaf {
    pub less_than: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetweenLeaf {
    pub between: [i64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainsLeaf {
    pub contains: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartsWithLeaf {
    pub starts_with: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndsWithLeaf {
    pub ends_with: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchesRegexLeaf {
    pub matches_regex: String,
}

/// Expression tree (leaf reference, and, or, not)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExprConfig {
    And(AndExpr),
    Or(OrExpr),
    Not(NotExpr),
    Leaf(LeafExpr),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeafExpr {
    pub leaf: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AndExpr {
    pub and: Vec<ExprConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrExpr {
    pub or: Vec<ExprConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotExpr {
    pub not: Box<ExprConfig>,
}

/// A scalar from YAML. `null` (or an absent key) is [`TestValue::Missing`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ValueConfig {
    Int(i64),
    Text(String),
}

impl From<ValueConfig> for TestValue {
    fn from(v: ValueConfig) -> Self {
        match v {
            ValueConfig::Int(i) => TestValue::Int(i),
            ValueConfig::Text(s) => TestValue::Text(s),
        }
    }
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub value: Option<ValueConfig>,
    pub expect: bool,
}

impl TestCase {
    /// The value this case feeds to the matcher.
    pub fn build_value(&self) -> TestValue {
        self.value.clone().into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building a fixture's matcher tree.
#[derive(Debug)]
pub enum FixtureError {
    /// `expr` references a leaf name that `leaves` does not declare.
    UnknownLeaf {
        /// The undeclared name.
        name: String,
    },
    /// A `matches_regex` pattern failed to compile.
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error.
        source: regex::Error,
    },
    /// A dynamic builder refused a combination.
    Composition(CompositionError),
}

impl FixtureError {
    /// Short code used by `expect_error` in fixtures.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownLeaf { .. } => "unknown_leaf",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Composition(CompositionError::FinalizedComposite { .. }) => {
                "finalized_composite"
            }
            Self::Composition(CompositionError::TooManyMatchers { .. }) => "too_many_matchers",
        }
    }
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLeaf { name } => write!(f, "expr references undeclared leaf \"{name}\""),
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::Composition(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownLeaf { .. } => None,
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Composition(e) => Some(e),
        }
    }
}

impl From<CompositionError> for FixtureError {
    fn from(e: CompositionError) -> Self {
        Self::Composition(e)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder: Convert config to matchkit types
// ═══════════════════════════════════════════════════════════════════════════════

/// A leaf built from config, erased so the arena can hold any of them.
pub type BoxedLeaf = Box<dyn Matcher<TestValue>>;

impl LeafConfig {
    /// Build the leaf matcher this config names.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPattern`] if a regex does not compile.
    pub fn build(&self) -> Result<BoxedLeaf, FixtureError> {
        let leaf: BoxedLeaf = match self {
            LeafConfig::Equals(e) => Box::new(Equals::new(e.equals.clone())),
            LeafConfig::GreaterThan(g) => Box::new(GreaterThan::new(g.greater_than)),
            LeafConfig::LessThan(l) => Box::new(LessThan::new(l.less_than)),
            LeafConfig::Between(b) => Box::new(Between::new(b.between[0], b.between[1])),
            LeafConfig::Contains(c) => Box::new(Contains::new(&c.contains)),
            LeafConfig::StartsWith(s) => Box::new(StartsWith::new(&s.starts_with)),
            LeafConfig::EndsWith(e) => Box::new(EndsWith::new(&e.ends_with)),
            LeafConfig::MatchesRegex(r) => Box::new(MatchesRegex::new(&r.matches_regex).map_err(
                |source| FixtureError::InvalidPattern {
                    pattern: r.matches_regex.clone(),
                    source,
                },
            )?),
        };
        Ok(leaf)
    }
}

/// One arena slot.
enum Node<'a> {
    Leaf(Described<BoxedLeaf>),
    All(AllOf<'a, TestValue>),
    Any(AnyOf<'a, TestValue>),
    Not(NotOf<'a, TestValue>),
}

impl Node<'_> {
    fn as_base(&self) -> &dyn MatcherBase<TestValue> {
        match self {
            Node::Leaf(l) => l,
            Node::All(a) => a,
            Node::Any(o) => o,
            Node::Not(n) => n,
        }
    }
}

/// Post-order construction step. Indices point at earlier slots.
enum Step {
    And(Vec<usize>),
    Or(Vec<usize>),
    Not(usize),
}

/// Flattened tree: leaf slots first, then composite steps.
struct Plan {
    leaves: Vec<BoxedLeaf>,
    steps: Vec<Step>,
    root: usize,
}

impl Fixture {
    fn plan(&self) -> Result<Plan, FixtureError> {
        let mut names = BTreeMap::new();
        let mut leaves = Vec::with_capacity(self.leaves.len());
        for (name, config) in &self.leaves {
            names.insert(name.as_str(), leaves.len());
            leaves.push(config.build()?);
        }

        let mut steps = Vec::new();
        let root = plan_expr(&self.expr, &names, leaves.len(), &mut steps)?;
        Ok(Plan {
            leaves,
            steps,
            root,
        })
    }
}

fn plan_expr(
    expr: &ExprConfig,
    names: &BTreeMap<&str, usize>,
    first_step: usize,
    steps: &mut Vec<Step>,
) -> Result<usize, FixtureError> {
    let step = match expr {
        ExprConfig::Leaf(l) => {
            return names
                .get(l.leaf.as_str())
                .copied()
                .ok_or_else(|| FixtureError::UnknownLeaf {
                    name: l.leaf.clone(),
                });
        }
        ExprConfig::And(a) => Step::And(plan_children(&a.and, names, first_step, steps)?),
        ExprConfig::Or(o) => Step::Or(plan_children(&o.or, names, first_step, steps)?),
        ExprConfig::Not(n) => Step::Not(plan_expr(&n.not, names, first_step, steps)?),
    };
    steps.push(step);
    Ok(first_step + steps.len() - 1)
}

fn plan_children(
    exprs: &[ExprConfig],
    names: &BTreeMap<&str, usize>,
    first_step: usize,
    steps: &mut Vec<Step>,
) -> Result<Vec<usize>, FixtureError> {
    exprs
        .iter()
        .map(|e| plan_expr(e, names, first_step, steps))
        .collect()
}

/// Fill the composite slots in order. Each step only reads earlier slots.
fn build_steps<'a>(
    slots: &'a [OnceCell<Node<'a>>],
    steps: Vec<Step>,
    first_step: usize,
) -> Result<(), FixtureError> {
    let slot = |i: usize| -> &'a dyn MatcherBase<TestValue> {
        match slots[i].get() {
            Some(node) => node.as_base(),
            None => unreachable!("plan only references earlier slots"),
        }
    };

    for (offset, step) in steps.into_iter().enumerate() {
        let node = match step {
            Step::And(children) => {
                let mut all = AllOf::new();
                for child in children {
                    all = try_and(Operand::Building(all), Operand::Borrowed(slot(child)))?;
                }
                Node::All(all)
            }
            Step::Or(children) => {
                let mut any = AnyOf::new();
                for child in children {
                    any = try_or(Operand::Building(any), Operand::Borrowed(slot(child)))?;
                }
                Node::Any(any)
            }
            Step::Not(child) => Node::Not(negate(slot(child))),
        };
        if slots[first_step + offset].set(node).is_err() {
            unreachable!("each slot is filled exactly once");
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub value: TestValue,
    pub expected: bool,
    pub actual: bool,
}

/// Result of running a whole fixture
#[derive(Debug)]
pub struct FixtureReport {
    /// The root matcher's rendered description.
    pub description: String,
    pub cases: Vec<CaseResult>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Parse a fixture from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build the tree, run all test cases, and render the root description.
    ///
    /// Cases run before the description is rendered, so evaluation never
    /// depends on a warm cache.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if the tree cannot be built.
    pub fn run(&self) -> Result<FixtureReport, FixtureError> {
        let Plan {
            leaves,
            steps,
            root,
        } = self.plan()?;

        let first_step = leaves.len();
        let slots: Vec<OnceCell<Node<'_>>> = leaves
            .into_iter()
            .map(|leaf| OnceCell::from(Node::Leaf(Described::new(leaf))))
            .chain(std::iter::repeat_with(OnceCell::new).take(steps.len()))
            .collect();
        build_steps(&slots, steps, first_step)?;

        let Some(root) = slots[root].get().map(Node::as_base) else {
            unreachable!("root slot is filled by the last step or is a leaf");
        };

        let cases = self
            .cases
            .iter()
            .map(|case| {
                let value = case.build_value();
                let actual = root.matches(&value);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    value,
                    expected: case.expect,
                    actual,
                }
            })
            .collect();

        Ok(FixtureReport {
            description: root.description().to_string(),
            cases,
        })
    }

    /// Run the fixture and panic on first failure
    pub fn run_and_assert(&self) {
        let report = match (self.run(), &self.expect_error) {
            (Ok(report), None) => report,
            (Err(e), Some(code)) => {
                assert_eq!(
                    e.code(),
                    code.as_str(),
                    "Fixture '{}' failed with the wrong error: {e}",
                    self.name
                );
                return;
            }
            (Ok(report), Some(code)) => panic!(
                "Fixture '{}' expected error '{code}', but built '{}'",
                self.name, report.description
            ),
            (Err(e), None) => panic!("Fixture '{}' failed to build: {e}", self.name),
        };

        if let Some(expected) = &self.expect_description {
            assert_eq!(
                &report.description, expected,
                "Fixture '{}' description mismatch",
                self.name
            );
        }

        for result in report.cases {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: value {}, expected {}, got {}",
                self.name, result.case_name, result.value, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = r#"
name: and_or_not
leaves:
  five: { equals: 5 }
  positive: { greater_than: 0 }
expr:
  or:
    - and: [{ leaf: five }, { leaf: positive }]
    - not: { leaf: positive }
cases:
  - { name: five, value: 5, expect: true }
  - { name: seven, value: 7, expect: false }
  - { name: negative, value: -5, expect: true }
  - { name: missing, expect: true }
"#;

    #[test]
    fn parses_and_runs_yaml() {
        let fixture = Fixture::from_yaml(SCENARIO).unwrap();
        let report = fixture.run().unwrap();

        assert_eq!(
            report.description,
            "( ( equals 5 and greater than 0 ) or not greater than 0 )"
        );
        assert!(report.cases.iter().all(|c| c.passed), "{:?}", report.cases);
    }

    #[test]
    fn parses_json_of_the_same_shape() {
        let json = serde_json::json!({
            "name": "json",
            "leaves": { "abc": { "starts_with": "ab" } },
            "expr": { "not": { "leaf": "abc" } },
            "cases": [
                { "name": "hit", "value": "xyz", "expect": true },
                { "name": "miss", "value": "abz", "expect": false }
            ]
        });
        let fixture = Fixture::from_json(&json.to_string()).unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn nested_same_kind_is_refused() {
        let fixture = Fixture::from_yaml(
            r#"
name: nested
leaves:
  a: { greater_than: 0 }
  b: { less_than: 10 }
  c: { equals: 5 }
expr:
  and:
    - and: [{ leaf: a }, { leaf: b }]
    - leaf: c
"#,
        )
        .unwrap();

        let err = fixture.run().unwrap_err();
        assert_eq!(err.code(), "finalized_composite");
        assert!(matches!(
            err,
            FixtureError::Composition(CompositionError::FinalizedComposite {
                kind: MatcherKind::AllOf,
                side: OperandSide::Right,
            })
        ));
    }

    #[test]
    fn unknown_leaf() {
        let fixture = Fixture::from_yaml("name: x\nexpr: { leaf: nope }\n").unwrap();
        let err = fixture.run().unwrap_err();
        assert_eq!(err.code(), "unknown_leaf");
        assert_eq!(err.to_string(), "expr references undeclared leaf \"nope\"");
    }

    #[test]
    fn invalid_regex() {
        let fixture = Fixture::from_yaml(
            "name: x\nleaves:\n  r: { matches_regex: '(' }\nexpr: { leaf: r }\n",
        )
        .unwrap();
        let err = fixture.run().unwrap_err();
        assert_eq!(err.code(), "invalid_pattern");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn shared_leaf_occupies_one_slot() {
        let fixture = Fixture::from_yaml(
            r#"
name: shared
leaves:
  a: { greater_than: 0 }
expr:
  and: [{ leaf: a }, { not: { leaf: a } }]
"#,
        )
        .unwrap();

        let plan = fixture.plan().unwrap();
        assert_eq!(plan.leaves.len(), 1);
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.root, 2);
        assert_eq!(
            fixture.run().unwrap().description,
            "( greater than 0 and not greater than 0 )"
        );
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = "name: one\nexpr: { and: [] }\n---\nname: two\nexpr: { or: [] }\n";
        let fixtures = Fixture::from_yaml_multi(yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].run().unwrap().description, "(  )");
        assert_eq!(fixtures[1].name, "two");
    }
}
