//! Shopper-facing flow: checkout page, PIX and card payment, status page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::domain::aggregates::{
    testimonial, CardCapture, CardForm, CheckoutConfig, Customer, IdentificationForm, PixCharge, PixMessage,
    PixSection, Product, Sale, SaleMethod, StatusPanel, Testimonial,
};
use crate::domain::countdown::CountdownSnapshot;
use crate::domain::value_objects::{CardBrand, PaymentStatus};
use crate::CheckoutError;

async fn active_product(s: &AppState, slug: &str) -> ApiResult<Product> {
    match s.store.product_by_slug(slug).await? {
        Some(p) if p.ativo => Ok(p),
        _ => Err(CheckoutError::NotFound("Produto").into()),
    }
}

fn status_path(slug: &str, status: PaymentStatus) -> String { format!("/payment-status/{}/{}", slug, status) }

#[derive(Debug, Serialize)]
pub struct InstallmentOption { pub quantidade: u32, pub valor: Decimal, pub valor_formatado: String }

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub produto: Product,
    pub valor_formatado: String,
    pub config: CheckoutConfig,
    pub depoimentos: Vec<Testimonial>,
    pub pix_mensagens: Vec<PixMessage>,
    pub pix_secoes: Vec<PixSection>,
    pub visitantes: Option<u32>,
    pub timer: Option<CountdownSnapshot>,
    pub parcelas: Vec<InstallmentOption>,
}

pub async fn checkout_page(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<CheckoutView>> {
    let produto = active_product(&s, &slug).await?;
    let config = s.checkout_config().await?;
    let depoimentos = if config.depoimentos_ativo { testimonial::visible(s.store.testimonials_for(produto.id).await?) } else { vec![] };
    let pix_mensagens = s.store.pix_messages_for(produto.id).await?;
    let mut pix_secoes = s.store.pix_sections_for(produto.id).await?;
    pix_secoes.retain(|sec| sec.ativo);

    let visitantes = config.visitor_counter().map(|c| c.sample(&mut rand::thread_rng()));
    let now = Utc::now();
    let timer = config.offer_countdown(now).map(|c| c.snapshot(now));
    let parcelas = if config.cartao_ativo {
        let max = u32::try_from(config.cartao_max_parcelas).unwrap_or(1).max(1);
        (1..=max)
            .map(|n| {
                let share = produto.price().split(n);
                InstallmentOption { quantidade: n, valor: share.amount(), valor_formatado: share.to_string() }
            })
            .collect()
    } else {
        vec![]
    };

    Ok(Json(CheckoutView {
        valor_formatado: produto.price().to_string(),
        produto, config, depoimentos, pix_mensagens, pix_secoes, visitantes, timer, parcelas,
    }))
}

#[derive(Debug, Serialize)]
pub struct PixPaymentResponse {
    pub venda_id: Uuid,
    pub cliente_id: Uuid,
    pub status: PaymentStatus,
    pub pix: PixCharge,
    pub expiracao: CountdownSnapshot,
    pub redirect: String,
}

pub async fn pay_with_pix(State(s): State<AppState>, Path(slug): Path<String>, ApiJson(form): ApiJson<IdentificationForm>) -> ApiResult<(StatusCode, Json<PixPaymentResponse>)> {
    let product = active_product(&s, &slug).await?;
    let config = s.checkout_config().await?;
    if !config.pix_ativo { return Err(ApiError::bad_request("Pagamento via PIX desabilitado")); }
    let pix = product.pix_charge()?;
    let customer = Customer::identify(form)?;
    let mut sale = Sale::register(&customer, &product, SaleMethod::Pix, PaymentStatus::Analyzing);
    let events = sale.take_events();

    let customer = s.store.insert_customer(&customer).await?;
    let sale = s.store.insert_sale(&sale).await?;
    events.iter().for_each(|e| e.trace());

    Ok((StatusCode::CREATED, Json(PixPaymentResponse {
        venda_id: sale.id,
        cliente_id: customer.id,
        status: sale.status,
        pix,
        expiracao: config.pix_countdown(sale.created_at).snapshot(Utc::now()),
        redirect: status_path(&product.slug, sale.status),
    })))
}

#[derive(Debug, Deserialize)]
pub struct CardPaymentRequest { pub cliente: IdentificationForm, pub cartao: CardForm }

#[derive(Debug, Serialize)]
pub struct CardPaymentResponse {
    pub venda_id: Uuid,
    pub cliente_id: Uuid,
    pub status: PaymentStatus,
    pub bandeira: CardBrand,
    pub ultimos_digitos: String,
    pub parcelas: i32,
    pub painel: StatusPanel,
    pub redirect: String,
}

/// Everything is validated before the first write so a bad card leaves no rows behind.
pub async fn pay_with_card(State(s): State<AppState>, Path(slug): Path<String>, ApiJson(r): ApiJson<CardPaymentRequest>) -> ApiResult<(StatusCode, Json<CardPaymentResponse>)> {
    let product = active_product(&s, &slug).await?;
    let config = s.checkout_config().await?;
    if !config.cartao_ativo { return Err(ApiError::bad_request("Pagamento com cartão desabilitado")); }
    let status = config.card_status();
    let customer = Customer::identify(r.cliente)?;
    let mut sale = Sale::register(&customer, &product, SaleMethod::Cartao, status);
    let capture = CardCapture::capture(&sale, r.cartao, config.cartao_max_parcelas)?;
    let mut events = sale.take_events();
    events.push(capture.event());

    let customer = s.store.insert_customer(&customer).await?;
    let sale = s.store.insert_sale(&sale).await?;
    let capture = s.store.insert_card_capture(&capture).await?;
    events.iter().for_each(|e| e.trace());

    Ok((StatusCode::CREATED, Json(CardPaymentResponse {
        venda_id: sale.id,
        cliente_id: customer.id,
        status: sale.status,
        bandeira: capture.bandeira,
        ultimos_digitos: capture.ultimos_digitos,
        parcelas: capture.parcelas,
        painel: config.status_panel(sale.status, &product.slug),
        redirect: status_path(&product.slug, sale.status),
    })))
}

#[derive(Debug, Serialize)]
pub struct ProductSummary { pub nome: String, pub slug: String, pub imagem_url: Option<String>, pub valor_formatado: String }

#[derive(Debug, Serialize)]
pub struct StatusPageView {
    pub status: PaymentStatus,
    pub painel: StatusPanel,
    pub produto: ProductSummary,
    pub config: CheckoutConfig,
}

async fn render_status(s: &AppState, slug: &str, raw_status: Option<&str>) -> ApiResult<Json<StatusPageView>> {
    let status = PaymentStatus::resolve(raw_status);
    let product = s.store.product_by_slug(slug).await?.ok_or(CheckoutError::NotFound("Produto"))?;
    let config = s.checkout_config().await?;
    Ok(Json(StatusPageView {
        status,
        painel: config.status_panel(status, &product.slug),
        produto: ProductSummary {
            valor_formatado: product.price().to_string(),
            nome: product.nome,
            slug: product.slug,
            imagem_url: product.imagem_url,
        },
        config,
    }))
}

pub async fn payment_status(State(s): State<AppState>, Path((slug, status)): Path<(String, String)>) -> ApiResult<Json<StatusPageView>> {
    render_status(&s, &slug, Some(&status)).await
}

pub async fn payment_status_default(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<StatusPageView>> {
    render_status(&s, &slug, None).await
}
