//! Schema model
//!
//! A schema is a tree of [`SchemaNode`]s:
//! - `Scalar`: a typed leaf value, optionally carrying an options mapping
//! - `Object`: declared fields plus object-level options
//! - `List`: an item schema plus list-level options
//!
//! Schemas are built programmatically with the builder methods below or
//! compiled from JSON by [`SchemaLoader`](super::SchemaLoader). Either way
//! they are wrapped in a [`Schema`], which checks the tree once before any
//! validation runs.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::chain::{Validator, ValidatorChain};
use super::errors::{SchemaError, SchemaResult, ValidationCode};
use crate::value::Value;

/// Leading marker that distinguishes option keys from field names
pub const OPTION_PREFIX: char = '@';

/// Declared type of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Dict,
    String,
    Decimal,
    Float,
    Bool,
    Int,
}

impl TypeTag {
    /// Parses a type tag; `str` is an alias of `string`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "dict" => Some(TypeTag::Dict),
            "string" | "str" => Some(TypeTag::String),
            "decimal" => Some(TypeTag::Decimal),
            "float" => Some(TypeTag::Float),
            "bool" => Some(TypeTag::Bool),
            "int" => Some(TypeTag::Int),
            _ => None,
        }
    }

    /// Parses the first comma segment of a shorthand tag string (`"int,whatever"`)
    pub fn parse_shorthand(tag: &str) -> Option<Self> {
        Self::parse(tag.split(',').next().unwrap_or(tag))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::Dict => "dict",
            TypeTag::String => "string",
            TypeTag::Decimal => "decimal",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeTag::String)
    }

    /// Whether `gt/gteq/lt/lteq/neq/eq` apply to this type
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            TypeTag::Int | TypeTag::Float | TypeTag::Decimal | TypeTag::String
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Bound comparison options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Gteq,
    Lt,
    Lteq,
    Neq,
    Eq,
}

impl Comparison {
    /// Parses an option name without the prefix
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "gt" => Some(Comparison::Gt),
            "gteq" => Some(Comparison::Gteq),
            "lt" => Some(Comparison::Lt),
            "lteq" => Some(Comparison::Lteq),
            "neq" => Some(Comparison::Neq),
            "eq" => Some(Comparison::Eq),
            _ => None,
        }
    }

    pub fn option_name(&self) -> &'static str {
        match self {
            Comparison::Gt => "gt",
            Comparison::Gteq => "gteq",
            Comparison::Lt => "lt",
            Comparison::Lteq => "lteq",
            Comparison::Neq => "neq",
            Comparison::Eq => "eq",
        }
    }

    /// Code reported when the comparison does not hold
    pub fn failure_code(&self) -> ValidationCode {
        match self {
            Comparison::Gt => ValidationCode::NotGt,
            Comparison::Gteq => ValidationCode::NotGteq,
            Comparison::Lt => ValidationCode::NotLt,
            Comparison::Lteq => ValidationCode::NotLteq,
            Comparison::Neq => ValidationCode::NotNeq,
            Comparison::Eq => ValidationCode::NotEq,
        }
    }

    /// Checks `subject <op> bound`. Unordered pairs (NaN) fail every
    /// ordering comparison.
    pub fn holds(&self, subject: &Value, bound: &Value) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match self {
            Comparison::Eq => subject.loose_eq(bound),
            Comparison::Neq => !subject.loose_eq(bound),
            Comparison::Gt => matches!(subject.compare(bound), Some(Greater)),
            Comparison::Gteq => matches!(subject.compare(bound), Some(Greater | Equal)),
            Comparison::Lt => matches!(subject.compare(bound), Some(Less)),
            Comparison::Lteq => matches!(subject.compare(bound), Some(Less | Equal)),
        }
    }
}

/// A closed set of allowed values usable with `in`
pub trait Enumeration {
    fn values() -> Vec<Value>;
}

/// A constraint checked in declaration order
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must equal one of these
    In(Vec<Value>),
    /// Value (or string length) must satisfy the comparison
    Compare(Comparison, Value),
    /// Validator chain; may replace the value
    Val(ValidatorChain),
}

/// Producer of a default value
pub type DefaultFn = dyn Fn() -> Value + Send + Sync;

/// Value used when an optional field is absent
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Producer(Arc<DefaultFn>),
}

impl DefaultValue {
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Anchored regular expression option
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern that must match at the start of the value
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

/// Options of a schema node
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Absence is allowed
    pub optional: bool,
    /// Used when an optional value is absent; not validated
    pub default: Option<DefaultValue>,
    /// Explicit null is allowed
    pub null: bool,
    /// Empty strings are allowed
    pub blank: bool,
    pub regexp: Option<Pattern>,
    /// `in`, comparisons and validators in declaration order
    pub constraints: Vec<Constraint>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(producer)));
        self
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Sets the `regexp` option
    ///
    /// # Errors
    ///
    /// Returns `BAD_REGEXP` if the pattern does not compile.
    pub fn regexp(mut self, pattern: &str) -> SchemaResult<Self> {
        let compiled = Pattern::new(pattern)
            .map_err(|e| SchemaError::bad_regexp("$", e.to_string()))?;
        self.regexp = Some(compiled);
        Ok(self)
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints
            .push(Constraint::In(values.into_iter().map(Into::into).collect()));
        self
    }

    /// `in` over every value of an enumeration
    pub fn one_of_enum<E: Enumeration>(mut self) -> Self {
        self.constraints.push(Constraint::In(E::values()));
        self
    }

    pub fn compare(mut self, comparison: Comparison, bound: impl Into<Value>) -> Self {
        self.constraints
            .push(Constraint::Compare(comparison, bound.into()));
        self
    }

    pub fn gt(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Gt, bound)
    }

    pub fn gteq(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Gteq, bound)
    }

    pub fn lt(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Lt, bound)
    }

    pub fn lteq(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Lteq, bound)
    }

    pub fn neq(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Neq, bound)
    }

    pub fn eq(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::Eq, bound)
    }

    /// Attaches a single validator
    pub fn val(mut self, validator: Validator) -> Self {
        self.constraints
            .push(Constraint::Val(ValidatorChain::Single(validator)));
        self
    }

    /// Attaches an ordered validator sequence
    pub fn val_seq(mut self, validators: Vec<Validator>) -> Self {
        self.constraints
            .push(Constraint::Val(ValidatorChain::Sequence(validators)));
        self
    }

    /// Validator chains in declaration order
    pub fn validators(&self) -> impl Iterator<Item = &ValidatorChain> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Val(chain) => Some(chain),
            _ => None,
        })
    }
}

/// One node of a schema tree
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// `options` is `None` for bare type tags, which skip option checks
    /// entirely (including the blank-string rule).
    Scalar {
        ty: TypeTag,
        options: Option<Options>,
    },
    Object {
        fields: Vec<(String, SchemaNode)>,
        options: Options,
    },
    List {
        item: Box<SchemaNode>,
        options: Options,
    },
}

impl SchemaNode {
    /// Bare type tag. `Dict` yields an object with no declared fields.
    pub fn scalar(ty: TypeTag) -> Self {
        match ty {
            TypeTag::Dict => SchemaNode::object(),
            ty => SchemaNode::Scalar { ty, options: None },
        }
    }

    /// Type tag with an options mapping
    pub fn scalar_with(ty: TypeTag, options: Options) -> Self {
        match ty {
            TypeTag::Dict => SchemaNode::object().with_options(options),
            ty => SchemaNode::Scalar {
                ty,
                options: Some(options),
            },
        }
    }

    pub fn object() -> Self {
        SchemaNode::Object {
            fields: Vec::new(),
            options: Options::default(),
        }
    }

    pub fn list(item: SchemaNode) -> Self {
        SchemaNode::List {
            item: Box::new(item),
            options: Options::default(),
        }
    }

    /// Declares an object field
    ///
    /// # Panics
    ///
    /// In debug builds, when `self` is a scalar or list node. Release builds
    /// ignore the field.
    pub fn field(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        let name = name.into();
        debug_assert!(
            matches!(self, SchemaNode::Object { .. }),
            "field '{}' declared on a non-object node",
            name
        );
        if let SchemaNode::Object { fields, .. } = &mut self {
            fields.push((name, node));
        }
        self
    }

    /// Replaces the node's options
    pub fn with_options(mut self, new_options: Options) -> Self {
        match &mut self {
            SchemaNode::Scalar { options, .. } => *options = Some(new_options),
            SchemaNode::Object { options, .. } | SchemaNode::List { options, .. } => {
                *options = new_options
            }
        }
        self
    }

    /// Declared type; lists have none
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            SchemaNode::Scalar { ty, .. } => Some(*ty),
            SchemaNode::Object { .. } => Some(TypeTag::Dict),
            SchemaNode::List { .. } => None,
        }
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            SchemaNode::Scalar { options, .. } => options.as_ref(),
            SchemaNode::Object { options, .. } | SchemaNode::List { options, .. } => {
                Some(options)
            }
        }
    }

    /// Checks the subtree for schema defects the builder cannot rule out.
    fn check(&self, path: &str) -> SchemaResult<()> {
        if let Some(options) = self.options() {
            for constraint in &options.constraints {
                if let Constraint::Compare(comparison, bound) = constraint {
                    let type_name = self.type_tag().map_or("list", |t| t.type_name());
                    let comparable = self.type_tag().is_some_and(|t| t.is_comparable());
                    if !comparable || bound.compare(bound).is_none() {
                        return Err(SchemaError::illegal_comparison(
                            path,
                            comparison.option_name(),
                            type_name,
                        ));
                    }
                }
            }
        }

        match self {
            SchemaNode::Scalar { .. } => Ok(()),
            SchemaNode::Object { fields, .. } => {
                for (name, node) in fields {
                    if name.starts_with(OPTION_PREFIX) {
                        return Err(SchemaError::bad_schema(
                            make_path(path, name),
                            format!("field name may not start with '{}'", OPTION_PREFIX),
                        ));
                    }
                    node.check(&make_path(path, name))?;
                }
                Ok(())
            }
            SchemaNode::List { item, .. } => item.check(&format!("{}[]", path)),
        }
    }
}

/// A checked schema, cheap to clone and share across threads
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<SchemaNode>,
}

impl Schema {
    /// Wraps a schema tree after checking it.
    ///
    /// # Errors
    ///
    /// - `ILLEGAL_COMPARISON` for a comparison on a non-comparable type or
    ///   with a non-numeric bound
    /// - `BAD_SCHEMA` for field names using the option prefix
    pub fn new(root: SchemaNode) -> SchemaResult<Self> {
        root.check("$")?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Number of fields declared on a root object
    pub fn field_count(&self) -> usize {
        match self.root.as_ref() {
            SchemaNode::Object { fields, .. } => fields.len(),
            _ => 0,
        }
    }
}

impl TryFrom<SchemaNode> for Schema {
    type Error = SchemaError;

    fn try_from(root: SchemaNode) -> SchemaResult<Self> {
        Schema::new(root)
    }
}

/// Creates a schema path from prefix and field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() || prefix == "$" {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;

    #[test]
    fn test_type_tag_aliases() {
        assert_eq!(TypeTag::parse("str"), Some(TypeTag::String));
        assert_eq!(TypeTag::parse("string"), Some(TypeTag::String));
        assert_eq!(TypeTag::parse("integer"), None);
        assert_eq!(TypeTag::parse_shorthand("int,positive"), Some(TypeTag::Int));
    }

    #[test]
    fn test_comparable_types() {
        assert!(TypeTag::Int.is_comparable());
        assert!(TypeTag::String.is_comparable());
        assert!(!TypeTag::Bool.is_comparable());
        assert!(!TypeTag::Dict.is_comparable());
    }

    #[test]
    fn test_comparison_holds() {
        let five = Value::Int(5);
        assert!(Comparison::Gt.holds(&Value::Int(6), &five));
        assert!(!Comparison::Gt.holds(&five, &five));
        assert!(Comparison::Gteq.holds(&five, &five));
        assert!(Comparison::Lt.holds(&Value::Float(4.5), &five));
        assert!(Comparison::Eq.holds(&Value::Float(5.0), &five));
        assert!(Comparison::Neq.holds(&Value::Float(f64::NAN), &five));
        assert!(!Comparison::Lteq.holds(&Value::Float(f64::NAN), &five));
    }

    #[test]
    fn test_bare_dict_tag_is_object() {
        assert!(matches!(
            SchemaNode::scalar(TypeTag::Dict),
            SchemaNode::Object { .. }
        ));
    }

    #[test]
    fn test_comparison_on_bool_rejected() {
        let node = SchemaNode::scalar_with(TypeTag::Bool, Options::new().gt(1));
        let err = Schema::new(SchemaNode::object().field("flag", node)).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::IllegalComparison);
        assert_eq!(err.path(), "flag");
    }

    #[test]
    fn test_comparison_with_string_bound_rejected() {
        let node = SchemaNode::scalar_with(TypeTag::Int, Options::new().lt("ten"));
        let err = Schema::new(node).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::IllegalComparison);
    }

    #[test]
    fn test_comparison_in_list_item_path() {
        let item = SchemaNode::scalar_with(TypeTag::Bool, Options::new().eq(1));
        let schema = SchemaNode::object().field("flags", SchemaNode::list(item));
        let err = Schema::new(schema).unwrap_err();
        assert_eq!(err.path(), "flags[]");
    }

    #[test]
    fn test_bad_regexp_rejected() {
        let err = Options::new().regexp("(unclosed").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::BadRegexp);
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let pattern = Pattern::new("[a-z]+").unwrap();
        assert!(pattern.is_match("abc123"));
        assert!(!pattern.is_match("123abc"));
    }

    #[test]
    fn test_field_count() {
        let schema = Schema::new(
            SchemaNode::object()
                .field("a", SchemaNode::scalar(TypeTag::Int))
                .field("b", SchemaNode::scalar(TypeTag::String)),
        )
        .unwrap();
        assert_eq!(schema.field_count(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-object node")]
    fn test_field_on_scalar_is_caught() {
        let _ = SchemaNode::scalar(TypeTag::Int).field("a", SchemaNode::scalar(TypeTag::Int));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "field 'b'")]
    fn test_field_on_list_is_caught() {
        let _ = SchemaNode::list(SchemaNode::object()).field("b", SchemaNode::object());
    }
}
