use super::*;
use crate::expr::{field, lit};
use crate::meta::{FieldDef, FieldKind};
use crate::schema::{ModelSchema, SchemaRegistry};
use crate::value::ToValue;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Clone)]
struct Person {
    id: i32,
    name: String,
    age: i32,
}

impl Entity for Person {
    const TYPE_NAME: &'static str = "Person";
    const TABLE: Option<&'static str> = Some("PESSOA");
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("id", FieldKind::Primitive).key(),
        FieldDef::new("name", FieldKind::String).max_length(80),
        FieldDef::new("age", FieldKind::Primitive),
    ];

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "age" => Some(self.age.to_value()),
            _ => None,
        }
    }
}

struct Product {
    code: String,
    description: Option<String>,
    price: Decimal,
}

impl Entity for Product {
    const TYPE_NAME: &'static str = "Product";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("code", FieldKind::String).key().select(),
        FieldDef::new("description", FieldKind::String)
            .select()
            .required(),
        FieldDef::new("price", FieldKind::Decimal),
        FieldDef::new("tags", FieldKind::Unsupported).required().unreadable(),
        FieldDef::new("supplier", FieldKind::Unsupported)
            .inverse()
            .unreadable(),
    ];

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "code" => Some(self.code.to_value()),
            "description" => Some(self.description.to_value()),
            "price" => Some(self.price.to_value()),
            _ => None,
        }
    }
}

struct AuditLine {
    message: String,
}

impl Entity for AuditLine {
    const TYPE_NAME: &'static str = "AuditLine";
    const FIELDS: &'static [FieldDef] = &[FieldDef::new("message", FieldKind::String)];

    fn value(&self, field: &str) -> Option<Value> {
        (field == "message").then(|| self.message.to_value())
    }
}

#[derive(Clone)]
struct Gauge {
    id: i32,
    ratio: f32,
    score: f64,
}

impl Entity for Gauge {
    const TYPE_NAME: &'static str = "Gauge";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("id", FieldKind::Primitive).key(),
        FieldDef::new("ratio", FieldKind::Primitive),
        FieldDef::new("score", FieldKind::Primitive),
    ];

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "ratio" => Some(self.ratio.to_value()),
            "score" => Some(self.score.to_value()),
            _ => None,
        }
    }
}

fn ann() -> Person {
    Person {
        id: 7,
        name: "Ann".into(),
        age: 30,
    }
}

fn widget() -> Product {
    Product {
        code: "W-1".into(),
        description: Some("Widget".into()),
        price: Decimal::from_str("19.90").unwrap(),
    }
}

#[test]
fn test_insert() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people.insert(&ann()).unwrap(),
        "INSERT INTO PESSOA (ID, NAME, AGE) VALUES (7, 'Ann', 30)"
    );
}

#[test]
fn test_insert_escapes_and_truncates() {
    let people = StatementBuilder::<Person>::new();
    let mut p = ann();
    p.name = format!("O'{}", "x".repeat(100));
    let sql = people.insert(&p).unwrap();
    let expected_name = format!("'O''{}'", "x".repeat(78));
    assert_eq!(
        sql,
        format!("INSERT INTO PESSOA (ID, NAME, AGE) VALUES (7, {expected_name}, 30)")
    );
}

#[test]
fn test_insert_skips_unsupported_and_inverse_fields() {
    let products = StatementBuilder::<Product>::new();
    assert_eq!(
        products.insert(&widget()).unwrap(),
        "INSERT INTO PRODUCT (CODE, DESCRIPTION, PRICE) VALUES ('W-1', 'Widget', 19.90)"
    );
}

#[test]
fn test_required_field_missing() {
    let products = StatementBuilder::<Product>::new();
    let mut p = widget();
    p.description = None;
    assert_eq!(
        products.insert(&p),
        Err(SqlExtError::MissingRequiredValue("DESCRIPTION".into()))
    );
}

#[test]
fn test_select_all() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(people.select(false).unwrap(), "SELECT * FROM PESSOA");
}

#[test]
fn test_select_marked_columns() {
    let products = StatementBuilder::<Product>::new();
    assert_eq!(
        products.select(false).unwrap(),
        "SELECT CODE, DESCRIPTION FROM PRODUCT"
    );
    assert_eq!(products.select(true).unwrap(), "SELECT * FROM PRODUCT");
}

#[test]
fn test_select_where_order() {
    let people = StatementBuilder::<Person>::new();
    let pred = field("age")
        .equals(30)
        .and(field("name").equals("Ann"))
        .and(field("id").equals(7));
    assert_eq!(
        people.select_where(&pred, false).unwrap(),
        "SELECT * FROM PESSOA WHERE NAME='Ann' AND AGE=30 AND ID=7"
    );
}

#[test]
fn test_select_where_single() {
    let products = StatementBuilder::<Product>::new();
    assert_eq!(
        products.select_where(&field("code").equals("W-1"), false).unwrap(),
        "SELECT CODE, DESCRIPTION FROM PRODUCT WHERE CODE='W-1'"
    );
}

#[test]
fn test_select_where_rejects_excluded_field() {
    let products = StatementBuilder::<Product>::new();
    let err = products
        .select_where(&field("supplier").equals(1), false)
        .unwrap_err();
    assert!(err.is_invalid_expression());
}

#[test]
fn test_select_where_drops_non_field_leaves() {
    let people = StatementBuilder::<Person>::new();
    let pred = lit(1).equals(1).and(field("id").equals(7));
    assert_eq!(
        people.select_where(&pred, false).unwrap(),
        "SELECT * FROM PESSOA WHERE ID=7"
    );
}

#[test]
fn test_select_where_sql() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people.select_where_sql(" AGE > 18 ", false).unwrap(),
        "SELECT * FROM PESSOA WHERE AGE > 18"
    );
    assert_eq!(
        people.select_where_sql("   ", false).unwrap(),
        "SELECT * FROM PESSOA"
    );
}

#[test]
fn test_update_all_fields() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people.update(&ann(), &field("id").into()).unwrap(),
        "UPDATE PESSOA SET NAME='Ann', AGE=30 WHERE ID=7"
    );
}

#[test]
fn test_update_composite_key() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people
            .update(&ann(), &Expr::fields(["id", "name"]))
            .unwrap(),
        "UPDATE PESSOA SET AGE=30 WHERE ID=7 AND NAME='Ann'"
    );
}

#[test]
fn test_update_diff() {
    let people = StatementBuilder::<Person>::new();
    let before = ann();
    let mut after = ann();
    after.age = 31;
    assert_eq!(
        people.update_diff(&after, &before, &field("id").into()).unwrap(),
        "UPDATE PESSOA SET AGE=31 WHERE ID=7"
    );
}

#[test]
fn test_update_diff_without_changes() {
    let people = StatementBuilder::<Person>::new();
    let err = people
        .update_diff(&ann(), &ann(), &field("id").into())
        .unwrap_err();
    assert_eq!(err, SqlExtError::NoDifferenceFound("Person".into()));
    assert!(err.is_no_difference());
}

#[test]
fn test_update_diff_ignores_key_changes() {
    let people = StatementBuilder::<Person>::new();
    let before = ann();
    let mut after = ann();
    after.id = 8;
    assert!(
        people
            .update_diff(&after, &before, &field("id").into())
            .unwrap_err()
            .is_no_difference()
    );
}

#[test]
fn test_update_by_key() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people.update_by_key(&ann(), None).unwrap(),
        "UPDATE PESSOA SET NAME='Ann', AGE=30 WHERE ID=7"
    );

    let products = StatementBuilder::<Product>::new();
    assert_eq!(
        products.update_by_key(&widget(), None).unwrap(),
        "UPDATE PRODUCT SET DESCRIPTION='Widget', PRICE=19.90 WHERE CODE='W-1'"
    );
}

#[test]
fn test_update_with_only_key_fields() {
    let people =
        StatementBuilder::<Person>::with_config(StatementConfig::new().with_fields(["id"]))
            .unwrap();
    assert_eq!(
        people.update(&ann(), &field("id").into()),
        Err(SqlExtError::NoPropertiesProvided("Person".into()))
    );
}

#[test]
fn test_delete() {
    let people = StatementBuilder::<Person>::new();
    assert_eq!(
        people.delete(&ann(), &field("id").into()).unwrap(),
        "DELETE FROM PESSOA WHERE ID=7"
    );
    assert_eq!(
        people.delete_by_key(&ann()).unwrap(),
        "DELETE FROM PESSOA WHERE ID=7"
    );
}

#[test]
fn test_implicit_key_missing() {
    let lines = StatementBuilder::<AuditLine>::new();
    let line = AuditLine {
        message: "hi".into(),
    };
    assert_eq!(
        lines.delete_by_key(&line),
        Err(SqlExtError::NoPrimaryKeyFound("AuditLine".into()))
    );
    assert!(lines.update_by_key(&line, None).unwrap_err().is_key_error());
}

#[test]
fn test_key_selector_on_excluded_field() {
    let products = StatementBuilder::<Product>::new();
    assert!(
        products
            .delete(&widget(), &field("supplier").into())
            .unwrap_err()
            .is_invalid_expression()
    );
    assert!(
        products
            .update(&widget(), &field("code").call("trim").into())
            .unwrap_err()
            .is_invalid_expression()
    );
}

#[test]
fn test_config_table_and_fields() {
    let config = StatementConfig::new()
        .with_table("people")
        .with_fields(["name", "id", "name"]);
    let people = StatementBuilder::<Person>::with_config(config).unwrap();
    assert_eq!(people.table(), "people");
    assert_eq!(
        people.insert(&ann()).unwrap(),
        "INSERT INTO people (NAME, ID) VALUES ('Ann', 7)"
    );
}

#[test]
fn test_config_field_list_drops_excluded() {
    let config = StatementConfig::new().with_fields(["code", "supplier"]);
    let products = StatementBuilder::<Product>::with_config(config).unwrap();
    assert_eq!(products.columns(), vec!["CODE"]);
}

#[test]
fn test_config_field_list_rejects_unreadable_field() {
    let err = StatementBuilder::<Product>::with_config(
        StatementConfig::new().with_fields(["code", "tags"]),
    )
    .err()
    .unwrap();
    assert!(err.is_invalid_expression());
    assert!(err.to_string().contains("'tags'"));
}

#[test]
fn test_config_unknown_field() {
    let err = StatementBuilder::<Person>::with_config(
        StatementConfig::new().with_fields(["salary"]),
    )
    .unwrap_err();
    assert!(err.is_invalid_expression());
}

#[test]
fn test_config_blank_table() {
    let people =
        StatementBuilder::<Person>::with_config(StatementConfig::new().with_table("  ")).unwrap();
    assert_eq!(
        people.insert(&ann()),
        Err(SqlExtError::NoTableProvided("Person".into()))
    );
    assert!(people.select(false).is_err());
}

#[test]
fn test_empty_field_list() {
    let empty: [&str; 0] = [];
    let people =
        StatementBuilder::<Person>::with_config(StatementConfig::new().with_fields(empty))
            .unwrap();
    assert_eq!(
        people.insert(&ann()),
        Err(SqlExtError::NoPropertiesProvided("Person".into()))
    );
}

#[test]
fn test_column_resolver() {
    let config = StatementConfig::new().with_column_resolver(|f| f.name.to_string());
    let people = StatementBuilder::<Person>::with_config(config).unwrap();
    assert_eq!(
        people.insert(&ann()).unwrap(),
        "INSERT INTO PESSOA (id, name, age) VALUES (7, 'Ann', 30)"
    );
    assert_eq!(
        people.delete(&ann(), &field("id").into()).unwrap(),
        "DELETE FROM PESSOA WHERE id=7"
    );
}

#[test]
fn test_schema_provider() {
    let mut schema = SchemaRegistry::new();
    schema.register(ModelSchema::new("Person", "people").with_column("name", "full_name"));
    let registry = Arc::new(Registry::with_provider(schema));

    let people = StatementBuilder::<Person>::with_registry(registry, StatementConfig::new())
        .unwrap();
    assert_eq!(
        people.insert(&ann()).unwrap(),
        "INSERT INTO people (ID, full_name, AGE) VALUES (7, 'Ann', 30)"
    );
}

#[test]
fn test_shared_registry_resolves_once() {
    let registry = Arc::new(Registry::new());
    let a = StatementBuilder::<Person>::with_registry(Arc::clone(&registry), StatementConfig::new())
        .unwrap();
    let b = StatementBuilder::<Person>::with_registry(
        Arc::clone(&registry),
        StatementConfig::new().with_table("other"),
    )
    .unwrap();

    assert_eq!(a.table(), "PESSOA");
    assert_eq!(b.table(), "other");
    let stats = registry.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_field_values() {
    let people = StatementBuilder::<Person>::new();
    let p = ann();
    let values = people.field_values(&p, people.fields()).unwrap();
    let literals: Vec<_> = values.iter().map(|v| v.literal.as_str()).collect();
    assert_eq!(literals, vec!["7", "'Ann'", "30"]);
    assert_eq!(values[2].raw, Value::Int(30));
}

#[test]
fn test_entity_ext() {
    let before = ann();
    let mut after = ann();
    after.name = "Anne".into();

    assert_eq!(
        after.insert_sql().unwrap(),
        "INSERT INTO PESSOA (ID, NAME, AGE) VALUES (7, 'Anne', 30)"
    );
    assert_eq!(
        after
            .insert_sql_with(StatementConfig::new().with_table("P2"))
            .unwrap(),
        "INSERT INTO P2 (ID, NAME, AGE) VALUES (7, 'Anne', 30)"
    );
    assert_eq!(
        after
            .update_sql(&field("id").into(), Some(&before))
            .unwrap(),
        "UPDATE PESSOA SET NAME='Anne' WHERE ID=7"
    );
}

#[test]
fn test_new_builders_share_registry() {
    let a = StatementBuilder::<Person>::new();
    let b = StatementBuilder::<Person>::new();
    let c = StatementBuilder::<Product>::with_config(StatementConfig::new()).unwrap();
    assert!(Arc::ptr_eq(a.registry(), b.registry()));
    assert!(Arc::ptr_eq(a.registry(), c.registry()));
    assert!(Arc::ptr_eq(a.registry(), &Registry::shared()));
    assert!(a.registry().cache().contains::<Person>());
}

#[test]
fn test_single_precision_literals() {
    let gauges = StatementBuilder::<Gauge>::new();
    let g = Gauge {
        id: 1,
        ratio: 1.1,
        score: 2.5,
    };
    assert_eq!(
        gauges.insert(&g).unwrap(),
        "INSERT INTO GAUGE (ID, RATIO, SCORE) VALUES (1, 1.1, 2.5)"
    );
}

#[test]
fn test_update_diff_treats_nan_as_unchanged() {
    let gauges = StatementBuilder::<Gauge>::new();
    let before = Gauge {
        id: 1,
        ratio: 0.5,
        score: f64::NAN,
    };
    let keys: Expr = field("id").into();

    assert_eq!(
        gauges.update_diff(&before, &before.clone(), &keys),
        Err(SqlExtError::NoDifferenceFound("Gauge".into()))
    );

    let mut after = before.clone();
    after.ratio = 0.25;
    assert_eq!(
        gauges.update_diff(&after, &before, &keys).unwrap(),
        "UPDATE GAUGE SET RATIO=0.25 WHERE ID=1"
    );

    let mut scored = before.clone();
    scored.score = 3.0;
    assert_eq!(
        gauges.update_diff(&scored, &before, &keys).unwrap(),
        "UPDATE GAUGE SET SCORE=3 WHERE ID=1"
    );
}
