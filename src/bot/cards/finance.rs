use chrono::{Datelike, FixedOffset};

use super::{back_row, button, progress_bar, Card, FINANCE_BAR};
use crate::database::models::{
    BillValue, Category, CategoryTotal, FinancialGoal, FixedBill, MonthSummary, StatementEntry,
};
use crate::utils::datetime::{month_name_pt, parse_rfc3339_utc};
use crate::utils::format::{escape_html, format_brl, percent_of};

const SECTION: &str = "━━━━━━━━━━━━━━━";

/// How many upcoming bills the finance hub previews.
const UPCOMING_PREVIEW: usize = 3;
/// Days ahead a bill counts as "upcoming".
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// A bill resolved against the viewed month: fixed bills use their amount,
/// variable ones the recorded value or the estimate.
#[derive(Debug, Clone)]
pub struct BillLine {
    pub emoji: String,
    pub name: String,
    pub amount: Option<f64>,
    pub estimated: bool,
    pub paid: bool,
    pub due_day: i64,
}

impl BillLine {
    pub fn from_bill(bill: &FixedBill, value: Option<&BillValue>) -> Self {
        let (amount, estimated) = if bill.is_variable {
            match value {
                Some(v) => (Some(v.amount), false),
                None => (bill.estimated_amount, true),
            }
        } else {
            (bill.amount, false)
        };

        BillLine {
            emoji: bill.emoji.clone(),
            name: bill.name.clone(),
            amount,
            estimated,
            paid: value.map(|v| v.is_paid).unwrap_or(false),
            due_day: bill.due_day,
        }
    }

    fn amount_label(&self) -> String {
        match self.amount {
            Some(v) if self.estimated => format!("~{}", format_brl(v)),
            Some(v) => format_brl(v),
            None => "valor a definir".to_string(),
        }
    }
}

pub fn month_label(month: u32, year: i32) -> String {
    format!("{} de {}", month_name_pt(month), year)
}

pub fn prev_month(month: u32, year: i32) -> (u32, i32) {
    if month == 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

pub fn next_month(month: u32, year: i32) -> (u32, i32) {
    if month == 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

/// Month overview: balance plus the bills due in the next few days.
pub fn finance_hub_card(
    month: u32,
    year: i32,
    today_day: i64,
    summary: &MonthSummary,
    bills: &[BillLine],
) -> Card {
    let mut text = format!(
        "💰 <b>FINANÇAS — {label}</b>\n\
         {SECTION}\n\
         💵 Saldo: <b>{balance}</b>\n\
         📈 Entradas: {income}\n\
         📉 Saídas: {expense}",
        label = month_label(month, year),
        balance = format_brl(summary.balance()),
        income = format_brl(summary.total_income),
        expense = format_brl(summary.total_expense),
    );

    let upcoming: Vec<&BillLine> = bills
        .iter()
        .filter(|b| !b.paid && b.due_day >= today_day && b.due_day <= today_day + UPCOMING_WINDOW_DAYS)
        .take(UPCOMING_PREVIEW)
        .collect();

    if !upcoming.is_empty() {
        text.push_str("\n\n📅 <b>PRÓXIMAS CONTAS</b>");
        for bill in upcoming {
            text.push_str(&format!(
                "\n⏳ {:02}/{:02} {} {} — {}",
                bill.due_day,
                month,
                bill.emoji,
                escape_html(&bill.name),
                bill.amount_label()
            ));
        }
    }

    Card::new(
        text,
        vec![
            vec![button("📈 Entrada", "fin_entrada"), button("📉 Saída", "fin_saida")],
            vec![
                button("📑 Contas Fixas", "fin_bills"),
                button("📂 Categorias", "fin_categories"),
            ],
            vec![button("📋 Extrato", "fin_extrato"), button("🎯 Metas", "fin_goals")],
            vec![button("📊 Relatórios", "fin_reports")],
            back_row("back_hub"),
        ],
    )
}

/// All active bills for the month with paid status and totals.
pub fn bills_card(month: u32, bills: &[BillLine]) -> Card {
    let mut text = format!("📑 <b>CONTAS FIXAS</b>\n{SECTION}\n");

    if bills.is_empty() {
        text.push_str("\nNenhuma conta cadastrada.");
    } else {
        let mut total = 0.0;
        let mut paid_total = 0.0;
        for bill in bills {
            let status = if bill.paid {
                "✅ pago".to_string()
            } else {
                format!("⏳ vence {:02}/{:02}", bill.due_day, month)
            };
            text.push_str(&format!(
                "\n{} <b>{}</b>\n\u{2003}{} — {}\n",
                bill.emoji,
                escape_html(&bill.name),
                status,
                bill.amount_label()
            ));
            if let Some(v) = bill.amount {
                total += v;
                if bill.paid {
                    paid_total += v;
                }
            }
        }
        text.push_str(&format!(
            "\n{SECTION}\nTotal fixo: {}\nPago: {}\nPendente: {}",
            format_brl(total),
            format_brl(paid_total),
            format_brl(total - paid_total)
        ));
    }

    Card::new(
        text,
        vec![
            vec![button("➕ Adicionar", "bill_add"), button("✏️ Editar", "bill_edit")],
            back_row("finances"),
        ],
    )
}

pub fn categories_card(categories: &[Category]) -> Card {
    let mut income_lines = Vec::new();
    let mut expense_lines = Vec::new();
    for category in categories {
        let line = format!("{} {}", category.emoji, escape_html(&category.name));
        if category.kind == "entrada" {
            income_lines.push(line);
        } else {
            expense_lines.push(line);
        }
    }

    let render = |lines: &[String]| {
        if lines.is_empty() {
            "Nenhuma categoria.".to_string()
        } else {
            lines.join("\n")
        }
    };

    let text = format!(
        "📂 <b>CATEGORIAS</b>\n\
         {SECTION}\n\
         📈 <b>ENTRADAS</b>\n{}\n\n\
         📉 <b>SAÍDAS</b>\n{}",
        render(&income_lines),
        render(&expense_lines),
    );

    Card::new(
        text,
        vec![
            vec![button("➕ Adicionar", "cat_add"), button("✏️ Editar", "cat_edit")],
            back_row("finances"),
        ],
    )
}

/// Recent transactions of the viewed month with prev/next navigation.
pub fn statement_card(
    month: u32,
    year: i32,
    entries: &[StatementEntry],
    offset: FixedOffset,
) -> Card {
    let mut text = format!(
        "📋 <b>EXTRATO — {label}</b>\n{SECTION}\n",
        label = month_label(month, year)
    );

    if entries.is_empty() {
        text.push_str("\nNenhuma transação este mês.");
    } else {
        for entry in entries {
            let (emoji, sign) = if entry.kind == "entrada" {
                ("📈", "+")
            } else {
                ("📉", "-")
            };
            let day_label = parse_rfc3339_utc(&entry.occurred_at)
                .map(|dt| {
                    let local = dt.with_timezone(&offset);
                    format!("{:02}/{:02}", local.day(), local.month())
                })
                .unwrap_or_else(|| "--/--".to_string());
            let label = entry
                .category_name
                .as_deref()
                .or(entry.description.as_deref())
                .unwrap_or("Sem descrição");
            text.push_str(&format!(
                "\n{} {} {} — {}{}",
                emoji,
                day_label,
                escape_html(label),
                sign,
                format_brl(entry.amount)
            ));
        }
    }

    let (pm, py) = prev_month(month, year);
    let (nm, ny) = next_month(month, year);
    Card::new(
        text,
        vec![
            vec![
                button("◀️ Mês anterior", &format!("fin_extrato_{pm}_{py}")),
                button("Próximo ▶️", &format!("fin_extrato_{nm}_{ny}")),
            ],
            back_row("finances"),
        ],
    )
}

pub fn goals_card(goals: &[FinancialGoal]) -> Card {
    let mut text = format!("🎯 <b>METAS</b>\n{SECTION}\n");

    if goals.is_empty() {
        text.push_str("\nNenhuma meta ativa.");
    } else {
        for goal in goals {
            let pct = percent_of(goal.current_amount, goal.target_amount);
            let bar = progress_bar(
                FINANCE_BAR,
                goal.current_amount / goal.target_amount.max(0.01),
                8,
            );
            text.push_str(&format!(
                "\n<b>{}</b>\n[{}] {}%\n{} de {}\n",
                escape_html(&goal.name),
                bar,
                pct,
                format_brl(goal.current_amount),
                format_brl(goal.target_amount)
            ));
        }
    }

    Card::new(
        text,
        vec![
            vec![button("➕ Nova Meta", "goal_add")],
            back_row("finances"),
        ],
    )
}

/// Current-month spending per category with bars relative to the largest.
pub fn reports_card(month: u32, year: i32, totals: &[CategoryTotal]) -> Card {
    let mut text = format!(
        "📊 <b>RELATÓRIO — {label}</b>\n{SECTION}\n\n<b>Gastos por categoria</b>\n",
        label = month_label(month, year)
    );

    if totals.is_empty() {
        text.push_str("\nNenhum gasto este mês.");
    } else {
        let max = totals.iter().map(|t| t.total).fold(0.0_f64, f64::max);
        for item in totals {
            let bar = progress_bar(FINANCE_BAR, item.total / max.max(0.01), 8);
            text.push_str(&format!(
                "\n{} {}\n[{}] {}\n",
                item.emoji,
                escape_html(&item.name),
                bar,
                format_brl(item.total)
            ));
        }
    }

    Card::new(text, vec![back_row("finances")])
}
