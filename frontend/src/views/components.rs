use yew::prelude::*;

#[derive(Clone, Copy, PartialEq)]
pub enum StatIcon {
    Wallet,
    TrendingUp,
    Dollar,
    PiggyBank,
}

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub title: &'static str,
    pub value: String,
    pub caption: String,
    pub icon: StatIcon,
    #[prop_or_default]
    pub footnote: Option<String>,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="bg-[#0a1735] p-6 rounded-[10px] border border-[#253256]">
            <div class="flex items-center justify-between pb-2">
                <p class="text-sm font-medium text-gray-300">{ props.title }</p>
                {
                    match props.icon {
                        StatIcon::Wallet => icon_wallet(),
                        StatIcon::TrendingUp => icon_trending_up(),
                        StatIcon::Dollar => icon_dollar(),
                        StatIcon::PiggyBank => icon_piggy_bank(),
                    }
                }
            </div>
            <h3 class="text-2xl font-bold text-white tracking-tight">{ props.value.clone() }</h3>
            <p class="text-xs text-green-400 flex items-center gap-1">{ props.caption.clone() }</p>
            if let Some(note) = &props.footnote {
                <p class="text-xs text-gray-400 mt-1">{ note.clone() }</p>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct QuickActionProps {
    pub label: &'static str,
    pub gradient: &'static str,
    #[prop_or_default]
    pub detail: Option<String>,
}

#[function_component(QuickAction)]
pub fn quick_action(props: &QuickActionProps) -> Html {
    html! {
        <div class={classes!("rounded-[10px]", "p-6", "text-center", "cursor-pointer", "transition-all", props.gradient)}>
            <p class="text-white font-medium">{ props.label }</p>
            if let Some(detail) = &props.detail {
                <p class="text-xs text-white/80 mt-1">{ detail.clone() }</p>
            }
        </div>
    }
}

fn icon_base(path: &'static str) -> Html {
    html! {
        <svg width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="text-[#f9a826]">
            <path d={path}></path>
        </svg>
    }
}

pub fn icon_wallet() -> Html {
    icon_base("M3 7h18v10H3zM16 7V5H5v2")
}
pub fn icon_trending_up() -> Html {
    icon_base("M3 17l6-6 4 4 7-7")
}
pub fn icon_dollar() -> Html {
    icon_base("M12 1v22M17 5H9.5a3.5 3.5 0 000 7h5a3.5 3.5 0 010 7H6")
}
pub fn icon_piggy_bank() -> Html {
    icon_base("M19 10c0-3.9-3.1-7-7-7S5 6.1 5 10v4l-2 3h18l-2-3z")
}
pub fn icon_globe() -> Html {
    icon_base("M12 2a10 10 0 100 20 10 10 0 000-20zM2 12h20M12 2a15 15 0 010 20M12 2a15 15 0 000 20")
}
pub fn icon_log_out() -> Html {
    icon_base("M9 21H5a2 2 0 01-2-2V5a2 2 0 012-2h4M16 17l5-5-5-5M21 12H9")
}
