use std::cell::Cell;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::currency::{format_currency, format_reference, CurrencyInfo, REFERENCE_CURRENCY};
use crate::geo::{detect_display_locale, DisplayLocale};
use crate::models::{same_email, InvestmentStatus, SessionUser, Transaction, TransactionKind};
use crate::views::components::{icon_globe, icon_log_out, QuickAction, StatCard, StatIcon};
use crate::views::{missing_context, AppContext};

const RECENT_ACTIVITY_LIMIT: usize = 5;

struct Plan {
    name: &'static str,
    tagline: &'static str,
    daily_return: &'static str,
    minimum: i64,
    maximum: Option<i64>,
    duration_days: u32,
    popular: bool,
}

const PLANS: &[Plan] = &[
    Plan {
        name: "Starter Plan",
        tagline: "Perfect for beginners",
        daily_return: "5.2%",
        minimum: 100,
        maximum: Some(5_000),
        duration_days: 30,
        popular: false,
    },
    Plan {
        name: "Professional Plan",
        tagline: "Most popular choice",
        daily_return: "8.7%",
        minimum: 5_000,
        maximum: Some(50_000),
        duration_days: 45,
        popular: true,
    },
    Plan {
        name: "VIP Plan",
        tagline: "Maximum returns",
        daily_return: "12.5%",
        minimum: 50_000,
        maximum: None,
        duration_days: 60,
        popular: false,
    },
];

/// Latest transactions for `email` from the embedded and flat lists, newest first.
/// An id present in both lists is shown once.
pub fn recent_activity(
    embedded: Vec<Transaction>,
    flat: Vec<Transaction>,
    email: &str,
    limit: usize,
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = Vec::new();
    for tx in embedded
        .into_iter()
        .chain(flat.into_iter().filter(|t| same_email(&t.user_email, email)))
    {
        if !merged.iter().any(|seen| seen.id == tx.id) {
            merged.push(tx);
        }
    }
    merged.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.id.len().cmp(&a.id.len()))
            .then_with(|| b.id.cmp(&a.id))
    });
    merged.truncate(limit);
    merged
}

/// Sum that saturates instead of panicking on out-of-range totals.
fn checked_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    let mut total = Decimal::ZERO;
    for amount in amounts {
        match total.checked_add(amount) {
            Some(next) => total = next,
            None => {
                warn!("investment total out of range, capping display");
                return if amount.is_sign_negative() { Decimal::MIN } else { Decimal::MAX };
            }
        }
    }
    total
}

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub user: SessionUser,
    pub on_logout: Callback<()>,
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &DashboardProps) -> Html {
    let context = use_context::<AppContext>();
    let Some(context) = context else {
        return missing_context("dashboard");
    };
    let balance = use_state(|| props.user.balance_or_zero());
    let locale = use_state(DisplayLocale::default);

    {
        let balance = balance.clone();
        let locale = locale.clone();
        let repo = context.repo.clone();
        let config = context.config.clone();
        let email = props.user.email.clone();

        use_effect_with_deps(
            move |email: &String| {
                match repo.ensure_minimum_balance(email, config.minimum_balance) {
                    Ok(Some(current)) => balance.set(current),
                    Ok(None) => debug!(email = %email, "session user has no record, showing session balance"),
                    Err(err) => warn!(error = %err, "could not initialize balance"),
                }

                let alive = Rc::new(Cell::new(true));
                {
                    let alive = alive.clone();
                    let url = config.geolocation_url.clone();
                    spawn_local(async move {
                        let detected = detect_display_locale(&url).await;
                        if alive.get() {
                            locale.set(detected);
                        }
                    });
                }
                move || alive.set(false)
            },
            email,
        );
    }

    let repo = &context.repo;
    let email = props.user.email.as_str();
    let currency: CurrencyInfo = locale.currency;
    let money = |amount: Decimal| format_currency(amount, &currency);

    let investments = repo.user_investments(email).unwrap_or_else(|err| {
        warn!(error = %err, "could not read investments");
        Vec::new()
    });
    let active_total = checked_total(
        investments
            .iter()
            .filter(|i| i.status == InvestmentStatus::Active)
            .map(|i| i.amount),
    );
    let total_profit = checked_total(investments.iter().map(|i| i.profit));

    let embedded = repo.user_transactions(email).unwrap_or_else(|err| {
        warn!(error = %err, "could not read user transactions");
        Vec::new()
    });
    let flat = repo.all_transactions().unwrap_or_else(|err| {
        warn!(error = %err, "could not read transactions");
        Vec::new()
    });
    let activity = recent_activity(embedded, flat, email, RECENT_ACTIVITY_LIMIT);

    let balance_footnote = (currency.code != REFERENCE_CURRENCY)
        .then(|| format!("≈ ${} USD", format_reference(*balance)));

    let on_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_: MouseEvent| on_logout.emit(()))
    };

    html! {
        <div class="min-h-screen bg-[#050e24] p-6 space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold text-white">{ format!("Welcome back, {}!", props.user.name) }</h1>
                    <p class="text-gray-400">{"Here's your investment overview"}</p>
                </div>
                <div class="flex items-center gap-3">
                    <div class="flex items-center gap-2 bg-[#0a1735] px-3 py-2 rounded-lg">
                        { icon_globe() }
                        <span class="text-white text-sm">{ format!("{} • {}", locale.country, currency.name) }</span>
                    </div>
                    <button onclick={on_logout} class="flex items-center gap-2 px-3 py-2 rounded-lg hover:bg-white/10 text-sm text-gray-300">
                        { icon_log_out() }
                        {"Sign out"}
                    </button>
                </div>
            </div>

            <div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4">
                <StatCard title="Total Balance" value={money(*balance)} caption="Available for withdrawal" icon={StatIcon::Wallet} footnote={balance_footnote} />
                <StatCard title="Active Investments" value={money(active_total)} caption={format!("{} plan(s) running", investments.iter().filter(|i| i.status == InvestmentStatus::Active).count())} icon={StatIcon::TrendingUp} />
                <StatCard title="Total Profit" value={money(total_profit)} caption="Across all plans" icon={StatIcon::Dollar} />
                <StatCard title="Available" value={money(*balance)} caption="Ready to withdraw" icon={StatIcon::PiggyBank} />
            </div>

            <div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4">
                <QuickAction label="Deposit" gradient="bg-gradient-to-r from-green-600 to-green-700" />
                <QuickAction label="Withdraw" gradient="bg-gradient-to-r from-blue-600 to-blue-700" detail={format!("{} available", money(*balance))} />
                <QuickAction label="Invest" gradient="bg-gradient-to-r from-purple-600 to-purple-700" />
                <QuickAction label="Verify" gradient="bg-gradient-to-r from-orange-600 to-orange-700" />
            </div>

            <div class="grid gap-6 md:grid-cols-2 lg:grid-cols-3">
                { for PLANS.iter().map(|plan| plan_card(plan, &currency)) }
            </div>

            <div class="bg-[#0a1735] border border-[#253256] rounded-[10px] p-6">
                <h3 class="text-white font-bold text-lg">{"Recent Activity"}</h3>
                <p class="text-gray-400 text-sm mb-4">{"Your latest transactions and investments"}</p>
                {
                    if activity.is_empty() {
                        html! { <p class="text-sm text-gray-400">{"No activity yet."}</p> }
                    } else {
                        html! {
                            <div class="space-y-4">
                                { for activity.iter().map(|tx| activity_row(tx, &currency)) }
                            </div>
                        }
                    }
                }
            </div>
        </div>
    }
}

fn plan_card(plan: &Plan, currency: &CurrencyInfo) -> Html {
    let ring = if plan.popular { "ring-2 ring-[#f9a826]" } else { "" };
    let maximum = plan
        .maximum
        .map(|max| format_currency(Decimal::from(max), currency))
        .unwrap_or_else(|| "Unlimited".to_string());

    html! {
        <div class={classes!("bg-[#0a1735]", "border", "border-[#253256]", "rounded-[10px]", "p-6", "space-y-4", ring)}>
            <div class="flex items-center justify-between">
                <div>
                    <h3 class="text-white font-bold">{ plan.name }</h3>
                    <p class="text-gray-400 text-sm">{ plan.tagline }</p>
                </div>
                if plan.popular {
                    <span class="bg-[#f9a826] text-black text-xs font-bold px-2 py-1 rounded">{"Popular"}</span>
                }
            </div>
            <div class="text-3xl font-bold text-[#f9a826]">{ plan.daily_return }</div>
            <p class="text-sm text-gray-400">{"Daily returns"}</p>
            <div class="space-y-2 text-sm">
                <div class="flex justify-between">
                    <span class="text-gray-400">{"Minimum:"}</span>
                    <span class="text-white">{ format_currency(Decimal::from(plan.minimum), currency) }</span>
                </div>
                <div class="flex justify-between">
                    <span class="text-gray-400">{"Maximum:"}</span>
                    <span class="text-white">{ maximum }</span>
                </div>
                <div class="flex justify-between">
                    <span class="text-gray-400">{"Duration:"}</span>
                    <span class="text-white">{ format!("{} days", plan.duration_days) }</span>
                </div>
            </div>
            <button class="w-full bg-[#f9a826] hover:bg-[#f9a826]/90 text-black py-2 rounded-lg font-semibold">{"Invest Now"}</button>
        </div>
    }
}

fn activity_row(tx: &Transaction, currency: &CurrencyInfo) -> Html {
    let (title, sign, tone) = match tx.kind {
        TransactionKind::Deposit => ("Deposit", "+", "text-green-400"),
        TransactionKind::Withdrawal => ("Withdrawal", "-", "text-blue-400"),
    };
    let status = tx.status.as_str();
    let status_label = format!("{}{}", status[..1].to_uppercase(), &status[1..]);

    html! {
        <div class="flex items-center justify-between p-3 bg-[#162040] rounded-lg">
            <div>
                <p class="text-white font-medium">{ title }</p>
                <p class="text-sm text-gray-400">{ format!("{} • {}", tx.method, tx.date) }</p>
            </div>
            <div class="text-right">
                <p class={classes!("font-medium", tone)}>{ format!("{}{}", sign, format_currency(tx.amount, currency)) }</p>
                <p class="text-sm text-gray-400">{ status_label }</p>
            </div>
        </div>
    }
}
