//! Populates a development database with an operator, customers and sales.

use anyhow::Context;
use rand::{seq::SliceRandom, Rng};
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};
use toystore::{
    auth::{services::hash_password, User},
    clientes::{cpf, dto::ClienteInput, services::create_cliente, PgClientes},
    config::AppConfig,
    vendas::{dto::CreateVendaRequest, services::create_venda},
};
use uuid::Uuid;

const NOMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fabio", "Gabriela", "Heitor", "Isabela", "Joao",
    "Karina", "Lucas", "Marina", "Nicolas", "Olivia", "Pedro", "Rafaela", "Samuel", "Tatiana",
    "Vitor",
];
const SOBRENOMES: &[&str] = &[
    "Almeida", "Barbosa", "Costa", "Dias", "Ferreira", "Gomes", "Lima", "Martins", "Oliveira",
    "Pereira", "Ribeiro", "Santos", "Silva", "Souza",
];

fn env_count(key: &str, default: usize) -> anyhow::Result<usize> {
    match std::env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("{key} must be a number")),
        Err(_) => Ok(default),
    }
}

fn random_cpf(rng: &mut impl Rng) -> String {
    let mut base = [0u8; 9];
    for d in base.iter_mut() {
        *d = rng.gen_range(0..10);
    }
    cpf::complete(base)
}

fn random_cliente(rng: &mut impl Rng, n: usize, tag: &str, now: OffsetDateTime) -> ClienteInput {
    let nome = NOMES.choose(rng).copied().unwrap_or("Cliente");
    let sobrenome = SOBRENOMES.choose(rng).copied().unwrap_or("Silva");
    let nascimento = now.date() - Duration::days(rng.gen_range(2 * 365..14 * 365));
    ClienteInput {
        nome: Some(format!("{nome} {sobrenome}")),
        email: Some(format!(
            "{}.{}.{n}.{tag}@seed.toystore.dev",
            nome.to_lowercase(),
            sobrenome.to_lowercase()
        )),
        nascimento: Some(nascimento.to_string()),
        telefone: rng
            .gen_bool(0.7)
            .then(|| format!("(11) 9{:04}-{:04}", rng.gen_range(0..10_000), rng.gen_range(0..10_000))),
        cpf: rng.gen_bool(0.8).then(|| random_cpf(&mut *rng)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info,toystore=info".to_string()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let email = std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@toystore.dev".into());
    let password = std::env::var("SEED_ADMIN_PASSWORD").context("SEED_ADMIN_PASSWORD not set")?;
    let name = std::env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Operador".into());
    let admin = User::upsert(&db, &name, &email.to_lowercase(), &hash_password(&password)?).await?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "operator ready");

    let n_clientes = env_count("SEED_CLIENTES", 50)?;
    let n_vendas = env_count("SEED_VENDAS", 300)?;
    let now = OffsetDateTime::now_utc().to_offset(config.store_offset);
    let tag = Uuid::new_v4().simple().to_string()[..8].to_string();
    let store = PgClientes::new(db.clone());
    let mut rng = rand::thread_rng();

    let mut ids = Vec::with_capacity(n_clientes);
    for n in 0..n_clientes {
        let input = random_cliente(&mut rng, n, &tag, now);
        match create_cliente(&store, input, now.date()).await {
            Ok(c) => ids.push(c.id),
            // generated CPFs may repeat digits or collide with earlier runs
            Err(e) if e.is_row_recoverable() => tracing::warn!(n, reason = %e, "cliente skipped"),
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!(count = ids.len(), "clientes created");

    if ids.is_empty() {
        return Ok(());
    }
    for _ in 0..n_vendas {
        let cliente_id = ids[rng.gen_range(0..ids.len())];
        let data = now
            - Duration::days(rng.gen_range(0..30))
            - Duration::minutes(rng.gen_range(0..24 * 60));
        let req = CreateVendaRequest {
            cliente_id,
            valor: Decimal::new(rng.gen_range(500..50_000), 2),
            data: Some(data),
        };
        create_venda(&db, &store, req, now).await?;
    }
    tracing::info!(count = n_vendas, "vendas created");
    Ok(())
}

