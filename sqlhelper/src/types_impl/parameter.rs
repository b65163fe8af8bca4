use crate::{DbValue, HelperError, HelperResult, SqlType};

/// A named parameter, to be bound to a placeholder `@name` in a command text.
///
/// The name can be given with or without the leading `@`.
///
/// # Example
///
/// ```rust
/// use sqlhelper::{Parameter, SqlType};
/// let params = [
///     Parameter::new("@city", "Zürich"),
///     Parameter::typed("min_pop", SqlType::Int, 100_000),
/// ];
/// assert_eq!(params[0].placeholder_name(), "city");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: String,
    sql_type: Option<SqlType>,
    value: DbValue,
}

impl Parameter {
    /// Creates a parameter without type hint.
    pub fn new<N: AsRef<str>, V: Into<DbValue>>(name: N, value: V) -> Self {
        Self {
            name: name.as_ref().to_string(),
            sql_type: None,
            value: value.into(),
        }
    }

    /// Creates a parameter with a type hint.
    pub fn typed<N: AsRef<str>, V: Into<DbValue>>(name: N, sql_type: SqlType, value: V) -> Self {
        Self {
            name: name.as_ref().to_string(),
            sql_type: Some(sql_type),
            value: value.into(),
        }
    }

    /// Adds or replaces the type hint.
    #[must_use]
    pub fn with_type(mut self, sql_type: SqlType) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    /// Returns the name as it was given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name without the leading `@`.
    pub fn placeholder_name(&self) -> &str {
        let name = self.name.trim();
        name.strip_prefix('@').unwrap_or(name)
    }

    /// Returns the type hint.
    pub fn sql_type(&self) -> Option<SqlType> {
        self.sql_type
    }

    /// Returns the value.
    pub fn value(&self) -> &DbValue {
        &self.value
    }

    fn to_binding(&self, index: usize, mode: BindingMode) -> HelperResult<Binding> {
        let name = self.placeholder_name();
        if name.is_empty() {
            return Err(HelperError::MissingParameterName { index });
        }
        let value = match (self.sql_type, mode) {
            (Some(sql_type), _) => sql_type.coerce(name, self.value.clone())?,
            (None, BindingMode::Advisory) => self.value.clone(),
            (None, BindingMode::Strict) => return Err(HelperError::MissingType(name.to_string())),
        };
        Ok(Binding {
            name: name.to_string(),
            sql_type: self.sql_type,
            value,
        })
    }
}

// How strictly the type hints of parameters are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BindingMode {
    // type hints are optional
    Advisory,
    // every parameter needs a type hint
    Strict,
}

// A validated parameter, ready to be bound.
#[derive(Debug)]
pub(crate) struct Binding {
    name: String,
    sql_type: Option<SqlType>,
    value: DbValue,
}

impl Binding {
    // Validates the parameter list: names must be present and unique
    // (ignoring ASCII case), values must fit to their type hints.
    pub(crate) fn try_from_params(
        params: &[Parameter],
        mode: BindingMode,
    ) -> HelperResult<Vec<Self>> {
        let mut bindings: Vec<Self> = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let binding = param.to_binding(index, mode)?;
            if bindings
                .iter()
                .any(|b| b.name.eq_ignore_ascii_case(&binding.name))
            {
                return Err(HelperError::DuplicateParameter(binding.name));
            }
            bindings.push(binding);
        }
        Ok(bindings)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    // Adopts the spelling that the placeholder has in the command text.
    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[cfg_attr(not(feature = "mssql"), allow(dead_code))]
    pub(crate) fn sql_type(&self) -> Option<SqlType> {
        self.sql_type
    }

    pub(crate) fn value(&self) -> &DbValue {
        &self.value
    }
}

#[cfg(test)]
mod test {
    use super::{Binding, BindingMode};
    use crate::{DbValue, HelperError, Parameter, SqlType};

    #[test]
    fn test_names() {
        let bindings = Binding::try_from_params(
            &[Parameter::new("@a", 1_i32), Parameter::new("b", "x")],
            BindingMode::Advisory,
        )
        .unwrap();
        assert_eq!(bindings[0].name(), "a");
        assert_eq!(bindings[1].name(), "b");

        assert!(matches!(
            Binding::try_from_params(
                &[Parameter::new("a", 1_i32), Parameter::new(" @ ", 2_i32)],
                BindingMode::Advisory
            ),
            Err(HelperError::MissingParameterName { index: 1 })
        ));
        assert!(matches!(
            Binding::try_from_params(
                &[Parameter::new("@Id", 1_i32), Parameter::new("id", 2_i32)],
                BindingMode::Advisory
            ),
            Err(HelperError::DuplicateParameter(name)) if name == "id"
        ));
    }

    #[test]
    fn test_strict() {
        assert!(matches!(
            Binding::try_from_params(&[Parameter::new("a", 1_i32)], BindingMode::Strict),
            Err(HelperError::MissingType(name)) if name == "a"
        ));

        let bindings = Binding::try_from_params(
            &[Parameter::typed("a", SqlType::BigInt, 1_i32)],
            BindingMode::Strict,
        )
        .unwrap();
        assert_eq!(*bindings[0].value(), DbValue::BIGINT(1));
        assert_eq!(bindings[0].sql_type(), Some(SqlType::BigInt));
    }
}
