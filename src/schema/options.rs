use async_graphql::dynamic::SchemaBuilder;
use serde::Deserialize;

/// Limits the engine enforces on every operation.
///
/// [`None`] leaves the respective limit off.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    /// Maximum depth of selection sets.
    pub depth: Option<usize>,

    /// Maximum complexity of an operation.
    pub complexity: Option<usize>,

    /// Maximum recursion depth of the engine's parser.
    pub recursive_depth: Option<usize>,
}

/// Engine options of a [`Schema`](crate::Schema).
///
/// Deserializable, so it may come from a configuration file:
///
/// ```rust
/// # use strong_graphql::SchemaOptions;
/// let options: SchemaOptions = serde_json::from_str(
///     r#"{"limits": {"depth": 10}, "introspection": false}"#,
/// ).unwrap();
///
/// assert_eq!(options.limits.depth, Some(10));
/// assert!(!options.introspection);
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Limits enforced on every operation.
    pub limits: Limits,

    /// Indicates whether introspection queries are served.
    pub introspection: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            introspection: true,
        }
    }
}

impl SchemaOptions {
    pub(crate) fn apply(self, mut builder: SchemaBuilder) -> SchemaBuilder {
        let Limits {
            depth,
            complexity,
            recursive_depth,
        } = self.limits;
        if let Some(depth) = depth {
            builder = builder.limit_depth(depth);
        }
        if let Some(complexity) = complexity {
            builder = builder.limit_complexity(complexity);
        }
        if let Some(depth) = recursive_depth {
            builder = builder.limit_recursive_depth(depth);
        }
        if !self.introspection {
            builder = builder.disable_introspection();
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{Limits, SchemaOptions};

    #[test]
    fn defaults_to_no_limits_and_introspection() {
        let options: SchemaOptions = serde_json::from_value(json!({})).unwrap();

        assert_eq!(options, SchemaOptions::default());
        assert!(options.introspection);
        assert_eq!(options.limits, Limits::default());
    }

    #[test]
    fn deserializes_camel_case() {
        let options: SchemaOptions = serde_json::from_value(json!({
            "limits": {"complexity": 100, "recursiveDepth": 32},
        }))
        .unwrap();

        assert_eq!(
            options.limits,
            Limits {
                depth: None,
                complexity: Some(100),
                recursive_depth: Some(32),
            },
        );
    }
}
