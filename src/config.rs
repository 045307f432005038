// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        AssetRepository, CatalogRepository, CustomerRepository, LedgerRepository,
        MerchantRepository, UserRepository,
    },
    services::{
        asset_service::AssetService, auth::AuthService, catalog_service::CatalogService,
        customer_service::CustomerService, ledger_service::LedgerService,
        merchant_service::MerchantService, report_service::ReportService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub merchant_service: MerchantService,
    pub catalog_service: CatalogService,
    pub customer_service: CustomerService,
    pub asset_service: AssetService,
    pub ledger_service: LedgerService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let merchant_repo = MerchantRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let asset_repo = AssetRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            merchant_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let merchant_service = MerchantService::new(merchant_repo, db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), db_pool.clone());
        let customer_service = CustomerService::new(customer_repo.clone(), db_pool.clone());
        let asset_service = AssetService::new(asset_repo.clone(), db_pool.clone());
        let ledger_service = LedgerService::new(
            ledger_repo.clone(),
            catalog_repo.clone(),
            customer_repo.clone(),
            asset_repo,
            db_pool.clone(),
        );
        let report_service = ReportService::new(ledger_repo, customer_repo, catalog_repo);

        Ok(Self {
            db_pool,
            auth_service,
            merchant_service,
            catalog_service,
            customer_service,
            asset_service,
            ledger_service,
            report_service,
        })
    }
}
