use super::atom_set::{AtomSet, AtomSetSeq};
use super::error::QueryError;

/// A value produced or consumed while evaluating an expression.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    AtomSet(AtomSet),
    AtomSetSeq(AtomSetSeq),
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant as shown in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::AtomSet(_) => "atom-set",
            Self::AtomSetSeq(_) => "atom-set-seq",
            Self::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &'static str) -> QueryError {
        QueryError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    /// Reads the value as a boolean.
    ///
    /// # Return
    ///
    /// Returns the flag, or [`QueryError::TypeMismatch`] naming the actual variant.
    pub fn as_bool(&self) -> Result<bool, QueryError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_number(&self) -> Result<f64, QueryError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn as_str(&self) -> Result<&str, QueryError> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_atom_set(&self) -> Result<&AtomSet, QueryError> {
        match self {
            Self::AtomSet(set) => Ok(set),
            other => Err(other.mismatch("atom-set")),
        }
    }

    pub fn as_atom_set_seq(&self) -> Result<&AtomSetSeq, QueryError> {
        match self {
            Self::AtomSetSeq(seq) => Ok(seq),
            other => Err(other.mismatch("atom-set-seq")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], QueryError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<AtomSet> for Value {
    fn from(value: AtomSet) -> Self {
        Self::AtomSet(value)
    }
}

impl From<AtomSetSeq> for Value {
    fn from(value: AtomSetSeq) -> Self {
        Self::AtomSetSeq(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_matching_payloads() {
        assert_eq!(Value::from(true).as_bool(), Ok(true));
        assert_eq!(Value::from(2.5).as_number(), Ok(2.5));
        assert_eq!(Value::from("CA").as_str(), Ok("CA"));
        assert_eq!(
            Value::List(vec![Value::from(1.0)]).as_list().map(|l| l.len()),
            Ok(1)
        );
    }

    #[test]
    fn mismatched_accessors_name_both_types() {
        let err = Value::from("CA").as_number().unwrap_err();
        assert_eq!(
            err,
            QueryError::TypeMismatch {
                expected: "number",
                found: "string"
            }
        );
        assert!(Value::from(1.0).as_atom_set().is_err());
    }
}
