//! Dashboard aggregation over sales rows.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::aggregates::{Product, Sale, SaleMethod};
use crate::domain::value_objects::{Money, PaymentStatus};

pub const DEFAULT_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 90;
const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts { pub analyzing: u64, pub approved: u64, pub rejected: u64 }

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts { pub pix: u64, pub cartao: u64 }

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales { pub dia: NaiveDate, pub quantidade: u64, pub receita: Decimal }

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales { pub produto_id: Uuid, pub nome: String, pub quantidade: u64, pub receita: Decimal }

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_vendas: u64,
    pub por_status: StatusCounts,
    pub por_metodo: MethodCounts,
    pub receita_aprovada: Decimal,
    pub receita_aprovada_formatada: String,
    pub ticket_medio: Decimal,
    pub ticket_medio_formatado: String,
    /// Percentage of sales approved, one decimal place.
    pub taxa_aprovacao: f64,
    pub total_produtos: u64,
    pub total_clientes: u64,
    pub cartoes_capturados: u64,
    pub vendas_por_dia: Vec<DailySales>,
    pub top_produtos: Vec<ProductSales>,
}

/// Counts that come from other tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Totals { pub clientes: u64, pub cartoes: u64 }

impl DashboardSummary {
    /// `days` is clamped to `1..=MAX_DAYS`; the window ends at `today` inclusive.
    /// Daily and per-product revenue count approved sales only.
    pub fn build(sales: &[Sale], products: &[Product], totals: Totals, today: NaiveDate, days: u32) -> Self {
        let mut por_status = StatusCounts::default();
        let mut por_metodo = MethodCounts::default();
        let mut approved_revenue = Money::zero();
        let mut by_product: HashMap<Uuid, (u64, Money)> = HashMap::new();

        for sale in sales {
            match sale.status {
                PaymentStatus::Analyzing => por_status.analyzing += 1,
                PaymentStatus::Approved => por_status.approved += 1,
                PaymentStatus::Rejected => por_status.rejected += 1,
            }
            match sale.metodo {
                SaleMethod::Pix => por_metodo.pix += 1,
                SaleMethod::Cartao => por_metodo.cartao += 1,
            }
            if sale.status == PaymentStatus::Approved {
                approved_revenue = approved_revenue.add(&sale.amount());
                let entry = by_product.entry(sale.produto_id).or_insert((0, Money::zero()));
                entry.0 += 1;
                entry.1 = entry.1.add(&sale.amount());
            }
        }

        let total = sales.len() as u64;
        let taxa_aprovacao = if total == 0 { 0.0 } else { (por_status.approved as f64 * 1000.0 / total as f64).round() / 10.0 };
        let ticket = approved_revenue.split(u32::try_from(por_status.approved).unwrap_or(u32::MAX));

        let mut top_produtos: Vec<ProductSales> = by_product
            .into_iter()
            .map(|(produto_id, (quantidade, receita))| ProductSales {
                produto_id,
                nome: products.iter().find(|p| p.id == produto_id).map(|p| p.nome.clone()).unwrap_or_else(|| "Produto removido".into()),
                quantidade,
                receita: receita.amount(),
            })
            .collect();
        top_produtos.sort_by(|a, b| b.receita.cmp(&a.receita).then(b.quantidade.cmp(&a.quantidade)).then(a.nome.cmp(&b.nome)));
        top_produtos.truncate(TOP_PRODUCTS);

        Self {
            total_vendas: total,
            por_status,
            por_metodo,
            receita_aprovada: approved_revenue.amount(),
            receita_aprovada_formatada: approved_revenue.to_string(),
            ticket_medio: ticket.amount(),
            ticket_medio_formatado: ticket.to_string(),
            taxa_aprovacao,
            total_produtos: products.len() as u64,
            total_clientes: totals.clientes,
            cartoes_capturados: totals.cartoes,
            vendas_por_dia: daily(sales, today, days.clamp(1, MAX_DAYS)),
            top_produtos,
        }
    }
}

fn daily(sales: &[Sale], today: NaiveDate, days: u32) -> Vec<DailySales> {
    let first = today.checked_sub_days(Days::new(u64::from(days - 1))).unwrap_or(today);
    let mut buckets: Vec<DailySales> = first
        .iter_days()
        .take(days as usize)
        .map(|dia| DailySales { dia, quantidade: 0, receita: Decimal::ZERO })
        .collect();
    for sale in sales {
        let dia = sale.created_at.date_naive();
        if let Some(bucket) = buckets.iter_mut().find(|b| b.dia == dia) {
            bucket.quantidade += 1;
            if sale.status == PaymentStatus::Approved { bucket.receita += sale.valor; }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::customer::tests::form;
    use crate::domain::aggregates::product::tests::input;
    use crate::domain::aggregates::Customer;
    use chrono::{TimeZone, Utc};

    fn sale(c: &Customer, p: &Product, m: SaleMethod, s: PaymentStatus, day: u32) -> Sale {
        let mut sale = Sale::register(c, p, m, s);
        sale.created_at = Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap();
        sale
    }

    #[test]
    fn test_summary_totals() {
        let c = Customer::identify(form()).unwrap();
        let a = Product::create(input("Curso A", Decimal::new(100, 0))).unwrap();
        let b = Product::create(input("Curso B", Decimal::new(50, 0))).unwrap();
        let sales = vec![
            sale(&c, &a, SaleMethod::Pix, PaymentStatus::Approved, 10),
            sale(&c, &a, SaleMethod::Cartao, PaymentStatus::Rejected, 10),
            sale(&c, &b, SaleMethod::Pix, PaymentStatus::Approved, 9),
            sale(&c, &b, SaleMethod::Pix, PaymentStatus::Analyzing, 1),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let s = DashboardSummary::build(&sales, &[a.clone(), b], Totals { clientes: 1, cartoes: 1 }, today, 7);

        assert_eq!(s.total_vendas, 4);
        assert_eq!(s.por_status, StatusCounts { analyzing: 1, approved: 2, rejected: 1 });
        assert_eq!(s.por_metodo, MethodCounts { pix: 3, cartao: 1 });
        assert_eq!(s.receita_aprovada, Decimal::new(150, 0));
        assert_eq!(s.receita_aprovada_formatada, "R$ 150,00");
        assert_eq!(s.ticket_medio, Decimal::new(75, 0));
        assert_eq!(s.taxa_aprovacao, 50.0);
        assert_eq!(s.top_produtos[0].nome, "Curso A");
        assert_eq!(s.top_produtos.len(), 2);
    }

    #[test]
    fn test_daily_window_is_zero_filled() {
        let c = Customer::identify(form()).unwrap();
        let p = Product::create(input("Curso", Decimal::new(10, 0))).unwrap();
        let sales = vec![
            sale(&c, &p, SaleMethod::Pix, PaymentStatus::Approved, 10),
            sale(&c, &p, SaleMethod::Pix, PaymentStatus::Analyzing, 10),
            sale(&c, &p, SaleMethod::Pix, PaymentStatus::Approved, 1),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let s = DashboardSummary::build(&sales, &[p], Totals::default(), today, 3);
        assert_eq!(s.vendas_por_dia.len(), 3);
        assert_eq!(s.vendas_por_dia[0].dia, NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
        assert_eq!(s.vendas_por_dia[0].quantidade, 0);
        assert_eq!(s.vendas_por_dia[2].quantidade, 2);
        assert_eq!(s.vendas_por_dia[2].receita, Decimal::new(10, 0));
    }

    #[test]
    fn test_empty_dashboard() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let s = DashboardSummary::build(&[], &[], Totals::default(), today, 0);
        assert_eq!(s.taxa_aprovacao, 0.0);
        assert_eq!(s.ticket_medio_formatado, "R$ 0,00");
        assert_eq!(s.vendas_por_dia.len(), 1);
        assert!(s.top_produtos.is_empty());
    }
}
