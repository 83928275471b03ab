//! CountdownBanner component - time left until launch.

use chrono::{DateTime, Utc};
use danmaku_core::Countdown;
use gloo::timers::callback::Interval;
use yew::prelude::*;

/// Refresh interval in milliseconds
const TICK_INTERVAL_MS: u32 = 1000;

/// Props for the CountdownBanner component.
#[derive(Properties, PartialEq)]
pub struct CountdownBannerProps {
    pub target: DateTime<Utc>,
}

#[function_component(CountdownBanner)]
pub fn countdown_banner(props: &CountdownBannerProps) -> Html {
    let countdown = Countdown::new(props.target);
    let parts = use_state(|| countdown.parts(Utc::now()));

    {
        let parts = parts.clone();
        use_effect_with(countdown, move |countdown| {
            let countdown = *countdown;
            parts.set(countdown.parts(Utc::now()));
            let interval = Interval::new(TICK_INTERVAL_MS, move || {
                parts.set(countdown.parts(Utc::now()));
            });

            move || drop(interval)
        });
    }

    if parts.is_zero() {
        return html! {
            <header class="countdown-banner finished">
                <h1>{ "We're live!" }</h1>
            </header>
        };
    }

    html! {
        <header class="countdown-banner">
            <div class="countdown-cell">
                <span class="countdown-value">{ parts.days }</span>
                <span class="countdown-label">{ "days" }</span>
            </div>
            <div class="countdown-cell">
                <span class="countdown-value">{ format!("{:02}", parts.hours) }</span>
                <span class="countdown-label">{ "hours" }</span>
            </div>
            <div class="countdown-cell">
                <span class="countdown-value">{ format!("{:02}", parts.minutes) }</span>
                <span class="countdown-label">{ "min" }</span>
            </div>
            <div class="countdown-cell">
                <span class="countdown-value">{ format!("{:02}", parts.seconds) }</span>
                <span class="countdown-label">{ "sec" }</span>
            </div>
        </header>
    }
}
