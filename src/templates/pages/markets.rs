// templates/pages/markets.rs

use crate::auth::User;
use crate::db::StoredMarket;
use crate::templates::components::{map_surface, market_card, MapMarker};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct MarketsVm<'a> {
    pub user: Option<&'a User>,
    pub markets: &'a [StoredMarket],
    pub maps_api_key: Option<&'a str>,
    pub alert: Option<&'a str>,
}

pub fn markets_page(vm: &MarketsVm<'_>) -> Markup {
    let markers: Vec<MapMarker> = vm
        .markets
        .iter()
        .map(|m| MapMarker {
            position: m.listing.location(),
            title: m.listing.name().to_string(),
        })
        .collect();
    let viewer = vm.user.map(|u| u.id.as_str());

    desktop_layout(
        "Markets",
        vm.user,
        html! {
            main class="container" {
                h1 { "Dutch Markets" }

                @if let Some(alert) = vm.alert {
                    div class="alert" role="alert" { (alert) }
                }

                (map_surface(vm.maps_api_key, &markers, None))

                @if vm.user.is_some() {
                    p { a class="primary" href="/markets/new" { "Add New Market" } }
                }

                @if vm.markets.is_empty() {
                    p { "No markets yet." }
                } @else {
                    div class="grid" {
                        @for market in vm.markets {
                            (market_card(market, viewer))
                        }
                    }
                }
            }
        },
    )
}
