//! Database-backed checks. Run with a disposable database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use rust_decimal::Decimal;
use sqlx::PgPool;
use time::macros::{date, datetime, offset};
use toystore::{
    clientes::{dto::ClienteInput, services, ClienteStore, PgClientes},
    error::AppError,
    vendas::{
        dto::{CreateVendaRequest, PeriodoQuery, PorDiaQuery},
        services as vendas,
    },
};
use uuid::Uuid;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL for integration tests");
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect");
    sqlx::migrate!("./migrations").run(&db).await.expect("migrate");
    db
}

fn input(email: &str) -> ClienteInput {
    ClienteInput {
        nome: Some("Teste Integracao".into()),
        email: Some(email.into()),
        nascimento: Some("2012-03-04".into()),
        ..Default::default()
    }
}

fn unique_email() -> String {
    format!("it-{}@toystore.test", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn soft_deleted_customer_stays_readable_but_unlisted() {
    let db = pool().await;
    let store = PgClientes::new(db.clone());
    let email = unique_email();
    let created = services::create_cliente(&store, input(&email), date!(2024 - 06 - 01))
        .await
        .unwrap();

    let deleted = services::delete_cliente(&store, created.id, datetime!(2024-06-02 10:00 UTC))
        .await
        .unwrap();
    assert!(deleted.deleted_at.is_some());

    let fetched = services::get_cliente(&store, created.id).await.unwrap();
    assert_eq!(fetched.deleted_at, deleted.deleted_at);

    let listed = services::list_clientes(&store, 100, 0, Some(email.clone()))
        .await
        .unwrap();
    assert!(listed.iter().all(|c| c.id != created.id));

    let again = services::delete_cliente(&store, created.id, datetime!(2024-06-03 10:00 UTC)).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn unique_index_violation_maps_to_conflict() {
    let db = pool().await;
    let store = PgClientes::new(db.clone());
    let email = unique_email();
    services::create_cliente(&store, input(&email), date!(2024 - 06 - 01))
        .await
        .unwrap();

    // Bypasses the pre-check so the database constraint answers.
    let data = toystore::clientes::validation::validate_cliente(input(&email), date!(2024 - 06 - 01))
        .unwrap();
    let err = store.insert(&data).await.unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("email"), "{msg}"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn aggregates_follow_store_days() {
    let db = pool().await;
    let store = PgClientes::new(db.clone());
    // A day no other test writes to; cleared so reruns start from zero.
    sqlx::query("DELETE FROM vendas WHERE data >= $1 AND data < $2")
        .bind(datetime!(1999-12-30 00:00 UTC))
        .bind(datetime!(2000-01-03 00:00 UTC))
        .execute(&db)
        .await
        .unwrap();

    let cliente = services::create_cliente(&store, input(&unique_email()), date!(2024 - 06 - 01))
        .await
        .unwrap();
    let now = datetime!(2024-06-01 12:00 UTC);
    for (valor, data) in [
        ("10.10", datetime!(2000-01-01 00:00 -3)),
        ("20.20", datetime!(2000-01-01 23:59 -3)),
        ("0.335", datetime!(2000-01-01 12:00 -3)),
        // midnight belongs to the next day only
        ("5.00", datetime!(2000-01-02 00:00 -3)),
    ] {
        let req = CreateVendaRequest {
            cliente_id: cliente.id,
            valor: valor.parse::<Decimal>().unwrap(),
            data: Some(data),
        };
        vendas::create_venda(&db, &store, req, now).await.unwrap();
    }

    let q = PeriodoQuery {
        inicio: Some("2000-01-01".into()),
        fim: Some("2000-01-01".into()),
    };
    let stats = vendas::estatisticas(&db, &q, date!(2024 - 06 - 01), offset!(-3))
        .await
        .unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.total_dia.to_string(), "30.64");
    assert_eq!(stats.ticket_medio.to_string(), "10.21");

    let q = PorDiaQuery {
        dias: None,
        inicio: Some("1999-12-31".into()),
        fim: Some("2000-01-02".into()),
    };
    let series = vendas::por_dia(&db, &q, date!(2024 - 06 - 01), offset!(-3))
        .await
        .unwrap();
    let totals: Vec<String> = series.iter().map(|d| d.total.to_string()).collect();
    assert_eq!(totals, ["0.00", "30.64", "5.00"]);
    let counts: Vec<i64> = series.iter().map(|d| d.count).collect();
    assert_eq!(counts, [0, 3, 1]);
}
