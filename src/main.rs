// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação públicas
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    // Rotas de autenticação protegidas
    let auth_protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/register", post(handlers::auth::register))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/{user_id}", put(handlers::users::edit_user))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let merchant_routes = Router::new()
        .route(
            "/",
            get(handlers::merchants::list_merchants).post(handlers::merchants::create_merchant),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route(
            "/{product_id}",
            put(handlers::catalog::edit_product).delete(handlers::catalog::delete_product),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let group_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_groups).post(handlers::catalog::create_group),
        )
        .route(
            "/{group_id}",
            put(handlers::catalog::edit_group).delete(handlers::catalog::delete_group),
        )
        .route("/{group_id}/refresh", post(handlers::catalog::refresh_group))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/{customer_id}",
            put(handlers::customers::edit_customer).delete(handlers::customers::delete_customer),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let asset_routes = Router::new()
        .route(
            "/",
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            "/{asset_id}",
            put(handlers::assets::edit_asset).delete(handlers::assets::delete_asset),
        )
        .route("/{asset_id}/refresh", post(handlers::assets::refresh_asset))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let entry_routes = Router::new()
        .route(
            "/",
            get(handlers::ledger::list_entries).post(handlers::ledger::create_entry),
        )
        .route(
            "/{entry_id}",
            put(handlers::ledger::edit_entry).delete(handlers::ledger::delete_entry),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let report_routes = Router::new()
        .route("/revenue", get(handlers::reports::revenue))
        .route("/weekly", get(handlers::reports::weekly))
        .route("/borrows", get(handlers::reports::borrows))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(auth_protected_routes))
        .nest("/api/users", user_routes)
        .nest("/api/merchants", merchant_routes)
        .nest("/api/products", product_routes)
        .nest("/api/groups", group_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/assets", asset_routes)
        .nest("/api/entries", entry_routes)
        .nest("/api/reports", report_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
