use serde_json::Value;

/// Policy controlling how data-model property names map to serialized field
/// names. Applied on the serialize path only; incoming documents are expected
/// to carry the names the data model declares.
pub trait PropertyNamingStrategy: Send + Sync + 'static {
  fn translate(&self, property: &str) -> String;
}

/// Keeps property names untouched. The default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalPropertyNamingStrategy;

impl PropertyNamingStrategy for IdenticalPropertyNamingStrategy {
  fn translate(&self, property: &str) -> String {
    property.to_string()
  }
}

/// Rewrites camelCase property names to snake_case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseNamingStrategy;

impl PropertyNamingStrategy for SnakeCaseNamingStrategy {
  fn translate(&self, property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
      if ch.is_ascii_uppercase() {
        if !out.is_empty() && !out.ends_with('_') {
          out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
      } else {
        out.push(ch);
      }
    }
    out
  }
}

/// Rewrites every object key in the tree through the strategy.
pub(crate) fn translate_keys(strategy: &dyn PropertyNamingStrategy, value: Value) -> Value {
  match value {
    Value::Object(map) => Value::Object(
      map
        .into_iter()
        .map(|(key, value)| (strategy.translate(&key), translate_keys(strategy, value)))
        .collect(),
    ),
    Value::Array(items) => Value::Array(items.into_iter().map(|item| translate_keys(strategy, item)).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;
  use serde_json::json;

  use super::*;

  #[test]
  fn identical_strategy_keeps_names() {
    assert_eq!(IdenticalPropertyNamingStrategy.translate("createdAt"), "createdAt");
  }

  #[rstest]
  #[case("createdAt", "created_at")]
  #[case("ID", "i_d")]
  #[case("plain", "plain")]
  #[case("already_snake", "already_snake")]
  fn snake_case_strategy_translates(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(SnakeCaseNamingStrategy.translate(input), expected);
  }

  #[test]
  fn translate_keys_rewrites_nested_objects() {
    let input = json!({"outerKey": {"innerKey": 1}, "list": [{"deepKey": true}]});
    let output = translate_keys(&SnakeCaseNamingStrategy, input);
    assert_eq!(output, json!({"outer_key": {"inner_key": 1}, "list": [{"deep_key": true}]}));
  }
}
