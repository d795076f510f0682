use std::collections::HashMap;

use serde_json::Value;

/// Named query parameters (`@name -> value`)
pub type Parameters = HashMap<String, Value>;

/// AST node for a complete SELECT statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    /// Projections in declaration order
    pub select_items: Vec<SelectItem>,
    /// FROM clause; `Table::default()` when the statement has no FROM
    pub table: Table,
    pub join_items: Vec<JoinItem>,
    /// WHERE clause
    pub filters: Option<Expression>,
    pub distinct: bool,
    /// TOP n or LIMIT n; `None` when neither is given
    pub count: Option<usize>,
    pub offset: usize,
    pub parameters: Parameters,
    pub order_expressions: Vec<OrderExpression>,
    pub group_by: Vec<SelectItem>,
    /// Set on the inner statement of `EXISTS(...)`
    pub exists: bool,
}

impl SelectStatement {
    /// Attach query parameters, replacing any previously bound set.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// FROM source (also used as the binding target of a JOIN)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Alias the source is bound under, when spelled out
    pub value: Option<String>,
    pub select_item: SelectItem,
    /// `FROM x IN <path>`: flatten the array at `select_item`
    pub is_in_select: bool,
}

/// `JOIN alias IN <path>` or `JOIN (SELECT ...) AS alias`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinItem {
    pub table: Table,
    pub select_item: SelectItem,
}

/// Any projectable or filterable expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectItem {
    /// Destination column name
    pub alias: Option<String>,
    /// Field path; first segment names a bound table
    pub path: Vec<String>,
    /// Children of `Object` and `Array` items
    pub select_items: Vec<SelectItem>,
    pub kind: SelectItemKind,
    /// Logical NOT
    pub invert: bool,
    /// `SELECT VALUE` / `SELECT *`: project the bare value
    pub is_top_level: bool,
}

impl SelectItem {
    /// A field path item, e.g. `SelectItem::path(&["c", "id"])`.
    pub fn path(segments: &[&str]) -> Self {
        Self {
            path: segments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn constant(constant: Constant) -> Self {
        Self {
            kind: SelectItemKind::Constant(constant),
            ..Default::default()
        }
    }

    pub fn function_call(function: FunctionCallType, arguments: Vec<Option<SelectItem>>) -> Self {
        Self {
            kind: SelectItemKind::FunctionCall(FunctionCall {
                function,
                arguments,
            }),
            ..Default::default()
        }
    }

    pub fn sub_query(statement: SelectStatement) -> Self {
        Self {
            kind: SelectItemKind::SubQuery(Box::new(statement)),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn top_level(mut self) -> Self {
        self.is_top_level = true;
        self
    }

    /// True when this item, or any nested child, calls an aggregate function.
    pub fn has_aggregate(&self) -> bool {
        if let SelectItemKind::FunctionCall(call) = &self.kind {
            if call.function.is_aggregate() {
                return true;
            }
        }
        self.select_items.iter().any(SelectItem::has_aggregate)
    }
}

/// Variant payload of a [`SelectItem`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectItemKind {
    #[default]
    Field,
    Object,
    Array,
    Constant(Constant),
    FunctionCall(FunctionCall),
    SubQuery(Box<SelectStatement>),
    BinaryExpression(Box<BinaryExpression>),
    /// Boolean expression used as a value
    Expression(Box<Expression>),
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    /// `@name`, resolved against the query parameters at evaluation time
    Parameter(String),
}

/// Predicate tree used by WHERE and by boolean projections
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Comparison(ComparisonExpression),
    Logical(LogicalExpression),
    Constant(Constant),
    SelectItem(SelectItem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpression {
    pub left: SelectItem,
    pub right: SelectItem,
    pub operation: ComparisonOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThanOrEqual => ">=",
        }
    }
}

/// Short-circuit AND/OR over sub-expressions, evaluated left to right
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub expressions: Vec<Expression>,
    pub operation: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    Or,
    And,
}

/// Arithmetic over two operands
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub left: SelectItem,
    pub right: SelectItem,
    pub operation: ArithmeticOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpression {
    pub select_item: SelectItem,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// Function invocation; optional trailing arguments are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function: FunctionCallType,
    pub arguments: Vec<Option<SelectItem>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCallType {
    // String
    StringEquals,
    Contains,
    EndsWith,
    StartsWith,
    Concat,
    IndexOf,
    ToString,
    Upper,
    Lower,
    Left,
    Length,
    LTrim,
    Replace,
    Replicate,
    Reverse,
    Right,
    RTrim,
    Substring,
    Trim,

    // Type checking
    IsDefined,
    IsArray,
    IsBool,
    IsFiniteNumber,
    IsInteger,
    IsNull,
    IsNumber,
    IsObject,
    IsPrimitive,
    IsString,

    // Array and set
    ArrayConcat,
    ArrayContains,
    ArrayContainsAny,
    ArrayContainsAll,
    ArrayLength,
    ArraySlice,
    SetIntersect,
    SetUnion,

    // Math
    MathAbs,
    MathAcos,
    MathAsin,
    MathAtan,
    MathCeiling,
    MathCos,
    MathCot,
    MathDegrees,
    MathExp,
    MathFloor,
    MathIntBitNot,
    MathLog10,
    MathRadians,
    MathRound,
    MathSign,
    MathSin,
    MathSqrt,
    MathSquare,
    MathTan,
    MathTrunc,
    MathAtn2,
    MathIntAdd,
    MathIntBitAnd,
    MathIntBitLeftShift,
    MathIntBitOr,
    MathIntBitRightShift,
    MathIntBitXor,
    MathIntDiv,
    MathIntMod,
    MathIntMul,
    MathIntSub,
    MathPower,
    MathLog,
    MathNumberBin,
    MathPi,
    MathRand,

    // Aggregate
    AggregateAvg,
    AggregateCount,
    AggregateMax,
    AggregateMin,
    AggregateSum,

    // Misc
    Iif,
    In,
}

impl FunctionCallType {
    /// Look up a function by its (case-insensitive) query name.
    ///
    /// `IN` is not callable by name; the parser produces it from the `x IN (...)` operator.
    pub fn from_name(name: &str) -> Option<Self> {
        use FunctionCallType::*;

        let function = match name.to_uppercase().as_str() {
            "STRINGEQUALS" => StringEquals,
            "CONTAINS" => Contains,
            "ENDSWITH" => EndsWith,
            "STARTSWITH" => StartsWith,
            "CONCAT" => Concat,
            "INDEX_OF" => IndexOf,
            "TOSTRING" => ToString,
            "UPPER" => Upper,
            "LOWER" => Lower,
            "LEFT" => Left,
            "LENGTH" => Length,
            "LTRIM" => LTrim,
            "REPLACE" => Replace,
            "REPLICATE" => Replicate,
            "REVERSE" => Reverse,
            "RIGHT" => Right,
            "RTRIM" => RTrim,
            "SUBSTRING" => Substring,
            "TRIM" => Trim,

            "IS_DEFINED" => IsDefined,
            "IS_ARRAY" => IsArray,
            "IS_BOOL" => IsBool,
            "IS_FINITE_NUMBER" => IsFiniteNumber,
            "IS_INTEGER" => IsInteger,
            "IS_NULL" => IsNull,
            "IS_NUMBER" => IsNumber,
            "IS_OBJECT" => IsObject,
            "IS_PRIMITIVE" => IsPrimitive,
            "IS_STRING" => IsString,

            "ARRAY_CONCAT" => ArrayConcat,
            "ARRAY_CONTAINS" => ArrayContains,
            "ARRAY_CONTAINS_ANY" => ArrayContainsAny,
            "ARRAY_CONTAINS_ALL" => ArrayContainsAll,
            "ARRAY_LENGTH" => ArrayLength,
            "ARRAY_SLICE" => ArraySlice,
            "SETINTERSECT" => SetIntersect,
            "SETUNION" => SetUnion,

            "ABS" => MathAbs,
            "ACOS" => MathAcos,
            "ASIN" => MathAsin,
            "ATAN" => MathAtan,
            "CEILING" => MathCeiling,
            "COS" => MathCos,
            "COT" => MathCot,
            "DEGREES" => MathDegrees,
            "EXP" => MathExp,
            "FLOOR" => MathFloor,
            "INTBITNOT" => MathIntBitNot,
            "LOG10" => MathLog10,
            "RADIANS" => MathRadians,
            "ROUND" => MathRound,
            "SIGN" => MathSign,
            "SIN" => MathSin,
            "SQRT" => MathSqrt,
            "SQUARE" => MathSquare,
            "TAN" => MathTan,
            "TRUNC" => MathTrunc,
            "ATN2" => MathAtn2,
            "INTADD" => MathIntAdd,
            "INTBITAND" => MathIntBitAnd,
            "INTBITLEFTSHIFT" => MathIntBitLeftShift,
            "INTBITOR" => MathIntBitOr,
            "INTBITRIGHTSHIFT" => MathIntBitRightShift,
            "INTBITXOR" => MathIntBitXor,
            "INTDIV" => MathIntDiv,
            "INTMOD" => MathIntMod,
            "INTMUL" => MathIntMul,
            "INTSUB" => MathIntSub,
            "POWER" => MathPower,
            "LOG" => MathLog,
            "NUMBERBIN" => MathNumberBin,
            "PI" => MathPi,
            "RAND" => MathRand,

            "AVG" => AggregateAvg,
            "COUNT" => AggregateCount,
            "MAX" => AggregateMax,
            "MIN" => AggregateMin,
            "SUM" => AggregateSum,

            "IIF" => Iif,
            _ => return None,
        };

        Some(function)
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            FunctionCallType::AggregateAvg
                | FunctionCallType::AggregateCount
                | FunctionCallType::AggregateMax
                | FunctionCallType::AggregateMin
                | FunctionCallType::AggregateSum
        )
    }

    /// Functions whose optional trailing arguments are padded with `None`
    /// up to the returned length.
    pub fn padded_arity(&self) -> Option<usize> {
        match self {
            FunctionCallType::StringEquals
            | FunctionCallType::Contains
            | FunctionCallType::EndsWith
            | FunctionCallType::StartsWith
            | FunctionCallType::IndexOf
            | FunctionCallType::ArraySlice
            | FunctionCallType::ArrayContains => Some(3),
            _ => None,
        }
    }
}
