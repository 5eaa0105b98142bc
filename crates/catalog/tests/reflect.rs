use catalog::prompt::{describe_graph, DescribeOptions};
use catalog::reflect;
use common::SqlDialect;
use serde_json::json;
use test_utils::{rowset, two_table_reflection_client, FakeClient};

#[tokio::test]
async fn reflects_a_two_table_schema_with_a_join() {
    let client = two_table_reflection_client();
    let graph = reflect(&client, SqlDialect::Postgres).await.unwrap();

    assert_eq!(graph.tables.len(), 2);
    let customers = graph.table_by_name("customers").unwrap();
    let orders = graph.table_by_name("orders").unwrap();

    // Declaration order survives.
    let order_columns: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(order_columns, vec!["id", "customer_id", "amount"]);

    // The foreign key resolved to the parent's freshly minted ids.
    let join = orders.column_by_name("customer_id").unwrap().join.as_ref().unwrap();
    assert_eq!(join.table, "customers");
    assert_eq!(join.column_key, "id");
    assert_eq!(join.table_id, customers.id);
    assert_eq!(join.column_id, customers.column_by_name("id").unwrap().id);

    // Constraint flags landed.
    assert_eq!(orders.column_by_name("id").unwrap().primary_key, Some(true));
    assert_eq!(orders.column_by_name("amount").unwrap().nullable, Some(true));
}

#[tokio::test]
async fn describe_renders_the_reflected_join() {
    let client = two_table_reflection_client();
    let graph = reflect(&client, SqlDialect::Postgres).await.unwrap();

    let text = describe_graph(&graph, &DescribeOptions::default()).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&text).unwrap();
    let orders = docs
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["table_name"] == "orders")
        .unwrap();
    let customer_id = orders["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "customer_id")
        .unwrap();
    assert_eq!(customer_id["join"]["table"], "customers");
    assert_eq!(customer_id["join"]["column_key"], "id");
}

#[tokio::test]
async fn each_reflection_mints_fresh_ids() {
    let client = two_table_reflection_client();
    let first = reflect(&client, SqlDialect::Postgres).await.unwrap();
    let second = reflect(&client, SqlDialect::Postgres).await.unwrap();
    assert_ne!(
        first.table_by_name("orders").unwrap().id,
        second.table_by_name("orders").unwrap().id
    );
}

#[tokio::test]
async fn self_referencing_foreign_keys_attach() {
    let columns = rowset(
        &["table_name", "column_name", "data_type", "is_nullable", "comment"],
        vec![
            vec![json!("employees"), json!("id"), json!("integer"), json!("NO"), serde_json::Value::Null],
            vec![json!("employees"), json!("manager_id"), json!("integer"), json!("YES"), serde_json::Value::Null],
        ],
    );
    let fks = rowset(
        &["table_name", "column_name", "foreign_table", "foreign_column"],
        vec![vec![json!("employees"), json!("manager_id"), json!("employees"), json!("id")]],
    );
    let client = FakeClient::new()
        .on("information_schema.columns", columns)
        .on("'FOREIGN KEY'", fks);

    let graph = reflect(&client, SqlDialect::Postgres).await.unwrap();
    let employees = graph.table_by_name("employees").unwrap();
    let join = employees.column_by_name("manager_id").unwrap().join.as_ref().unwrap();
    assert_eq!(join.table, "employees");
    assert_eq!(join.column_id, employees.column_by_name("id").unwrap().id);
}

#[tokio::test]
async fn sqlite_reflection_goes_through_pragma() {
    let tables = rowset(&["name"], vec![vec![json!("orders")]]);
    let info = rowset(
        &["cid", "name", "type", "notnull", "dflt_value", "pk"],
        vec![
            vec![json!(0), json!("id"), json!("INTEGER"), json!(1), serde_json::Value::Null, json!(1)],
            vec![json!(1), json!("amount"), json!("REAL"), json!(0), serde_json::Value::Null, json!(0)],
        ],
    );
    let client = FakeClient::new()
        .on("sqlite_master", tables)
        .on("PRAGMA table_info('orders')", info);

    let graph = reflect(&client, SqlDialect::Sqlite).await.unwrap();
    let orders = graph.table_by_name("orders").unwrap();
    assert_eq!(orders.column_by_name("id").unwrap().primary_key, Some(true));
    assert_eq!(orders.column_by_name("amount").unwrap().nullable, Some(true));
}

#[tokio::test]
async fn driver_failure_surfaces_as_reflection_error() {
    let client = FakeClient::new().fail_on("information_schema.columns", "permission denied");
    let err = reflect(&client, SqlDialect::Postgres).await.unwrap_err();
    assert!(matches!(err, catalog::CatalogError::Reflection { .. }));
}
