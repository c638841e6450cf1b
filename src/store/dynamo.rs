use crate::domain::DataStore;
use crate::errors::StoreError;
use crate::query::{Condition, ListQuery};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client as DynamoDbClient, types::AttributeValue};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// DynamoDB-backed `DataStore`: one table per collection, partition key `id`.
///
/// Equality and membership predicates are pushed into the scan's filter
/// expression to cut transfer; the full query description is then re-applied
/// in memory, because DynamoDB's `contains` is case-sensitive and scan
/// results are unordered.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: DynamoDbClient,
    table_prefix: String,
}

impl DynamoDbStore {
    pub fn new(client: DynamoDbClient, table_prefix: String) -> Self {
        tracing::info!(%table_prefix, "Initializing DynamoDbStore");
        Self { client, table_prefix }
    }

    fn table(&self, collection: &str) -> String {
        format!("{}{}", self.table_prefix, collection)
    }
}

#[async_trait]
impl DataStore for DynamoDbStore {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let table = self.table(collection);
        let filter = ScanFilter::build(&query.conditions);

        let mut records: Vec<Value> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request = self.client.scan().table_name(&table);
            if let Some(expression) = &filter.expression {
                request = request
                    .filter_expression(expression.clone())
                    .set_expression_attribute_names(Some(filter.names.clone()))
                    .set_expression_attribute_values(Some(filter.values.clone()));
            }
            if let Some(key) = last_evaluated_key {
                request = request.set_exclusive_start_key(Some(key));
            }

            let resp = request
                .send()
                .await
                .context(format!("DynamoDB: failed to scan table '{table}'"))
                .map_err(StoreError::Backend)?;

            for item in resp.items.unwrap_or_default() {
                records.push(item_to_value(item));
            }

            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
            tracing::debug!(%table, "DynamoDB scan: continuing with LastEvaluatedKey");
        }

        // Re-evaluate everything locally so both backends share one semantics.
        let matched = query.apply(records);
        tracing::debug!(%table, matched = matched.len(), "DynamoDB: list complete");
        Ok(matched)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let table = self.table(collection);
        let resp = self
            .client
            .get_item()
            .table_name(&table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .context(format!("DynamoDB: failed to get '{id}' from table '{table}'"))
            .map_err(StoreError::Backend)?;

        Ok(resp.item.map(item_to_value))
    }

    async fn create(&self, collection: &str, record: Value) -> Result<(), StoreError> {
        let table = self.table(collection);
        let item = value_to_item(record)?;
        if !matches!(item.get("id"), Some(AttributeValue::S(_))) {
            return Err(StoreError::InvalidRecord(
                "record has no string 'id' field".to_string(),
            ));
        }

        self.client
            .put_item()
            .table_name(&table)
            .set_item(Some(item))
            .send()
            .await
            .context(format!("DynamoDB: failed to put record into table '{table}'"))
            .map_err(StoreError::Backend)?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let table = self.table(collection);
        let patch = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::InvalidRecord(
                    "update patch must be a JSON object".to_string(),
                ));
            }
        };

        let mut assignments = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for (i, (field, value)) in patch.into_iter().enumerate() {
            if field == "id" {
                // The partition key is immutable.
                continue;
            }
            let name = format!("#u{i}");
            let placeholder = format!(":u{i}");
            assignments.push(format!("{name} = {placeholder}"));
            names.insert(name, field);
            values.insert(placeholder, to_attr(value));
        }
        if assignments.is_empty() {
            return Ok(());
        }

        let result = self
            .client
            .update_item()
            .table_name(&table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(format!("SET {}", assignments.join(", ")))
            .condition_expression("attribute_exists(id)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sdk_err) => {
                let conditional_failed = sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception());
                if conditional_failed {
                    Err(StoreError::not_found(collection, id))
                } else {
                    Err(StoreError::Backend(anyhow::Error::new(sdk_err).context(
                        format!("DynamoDB: failed to update '{id}' in table '{table}'"),
                    )))
                }
            }
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let table = self.table(collection);
        // DeleteItem succeeds even when the item is absent.
        self.client
            .delete_item()
            .table_name(&table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .context(format!("DynamoDB: failed to delete '{id}' from table '{table}'"))
            .map_err(StoreError::Backend)?;
        Ok(())
    }
}

/// Equality/membership predicates expressed as a scan filter. Substring
/// predicates stay out: they are matched locally, case-insensitively.
struct ScanFilter {
    expression: Option<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl ScanFilter {
    fn build(conditions: &[Condition]) -> Self {
        let mut clauses = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (i, condition) in conditions.iter().enumerate() {
            let name = format!("#f{i}");
            match condition {
                Condition::Eq(field, value) => {
                    let placeholder = format!(":v{i}");
                    clauses.push(format!("{name} = {placeholder}"));
                    names.insert(name, field.clone());
                    values.insert(placeholder, to_attr(value.clone()));
                }
                Condition::In(field, members) if !members.is_empty() => {
                    let placeholders: Vec<String> = members
                        .iter()
                        .enumerate()
                        .map(|(j, member)| {
                            let placeholder = format!(":v{i}_{j}");
                            values.insert(placeholder.clone(), to_attr(member.clone()));
                            placeholder
                        })
                        .collect();
                    clauses.push(format!("{name} IN ({})", placeholders.join(", ")));
                    names.insert(name, field.clone());
                }
                Condition::In(_, _) | Condition::Contains(_, _) => {}
            }
        }

        let expression = if clauses.is_empty() { None } else { Some(clauses.join(" AND ")) };
        ScanFilter { expression, names, values }
    }
}

fn to_attr(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => AttributeValue::L(items.into_iter().map(to_attr).collect()),
        Value::Object(map) => {
            AttributeValue::M(map.into_iter().map(|(k, v)| (k, to_attr(v))).collect())
        }
    }
}

fn from_attr(attr: AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => parse_number(&n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.into_iter().map(from_attr).collect()),
        AttributeValue::M(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, from_attr(v))).collect())
        }
        AttributeValue::Ss(items) => {
            Value::Array(items.into_iter().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => {
            Value::Array(items.iter().map(|n| parse_number(n)).collect())
        }
        other => {
            tracing::warn!(?other, "Dropping unsupported DynamoDB attribute");
            Value::Null
        }
    }
}

fn parse_number(n: &str) -> Value {
    if let Ok(int) = n.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn item_to_value(item: HashMap<String, AttributeValue>) -> Value {
    Value::Object(item.into_iter().map(|(k, v)| (k, from_attr(v))).collect())
}

fn value_to_item(value: Value) -> Result<HashMap<String, AttributeValue>, StoreError> {
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, to_attr(v))).collect()),
        _ => Err(StoreError::InvalidRecord("record must be a JSON object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attribute_round_trip() {
        let record = json!({
            "id": "g1",
            "title": "Deploy Friday",
            "downloads": 12,
            "duration": 2.5,
            "is_trending": true,
            "thumbnail_url": null,
            "tags": ["deploy", "friday"],
        });
        let item = value_to_item(record.clone()).unwrap();
        assert_eq!(item_to_value(item), record);
    }

    #[test]
    fn scan_filter_covers_eq_and_in_only() {
        let filter = ScanFilter::build(&[
            Condition::eq("category", "developers"),
            Condition::contains("title", "friday"),
            Condition::is_in("id", vec![json!("a"), json!("b")]),
        ]);
        let expression = filter.expression.unwrap();
        assert_eq!(expression, "#f0 = :v0 AND #f2 IN (:v2_0, :v2_1)");
        assert_eq!(filter.names.len(), 2);
        assert_eq!(filter.values.len(), 3);
    }

    #[test]
    fn scan_filter_absent_for_contains_only() {
        let filter = ScanFilter::build(&[Condition::contains("title", "x")]);
        assert!(filter.expression.is_none());
    }
}
