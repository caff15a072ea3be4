use maud::{html, Markup};

use crate::db::StoredMarket;

fn joined<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Card for the browse page. The delete button only shows for the creator.
pub fn market_card(market: &StoredMarket, viewer_id: Option<&str>) -> Markup {
    let listing = &market.listing;
    let address = listing.address();
    let owned = viewer_id == Some(listing.created_by());

    html! {
        article class="card" id=(format!("market-{}", market.id)) {
            h3 { (listing.name()) }
            p { (listing.description()) }
            p { (address.street) ", " (address.postal_code) " " (address.city) }
            p {
                strong { "Open: " }
                (joined(listing.operating_days()))
            }
            p {
                strong { "Hours: " }
                (listing.opening_time().format("%H:%M")) " - " (listing.closing_time().format("%H:%M"))
            }
            div class="chips" {
                @for category in listing.categories() {
                    span class="tag" { (category) }
                }
            }
            @if owned {
                form method="post" action=(format!("/markets/{}/delete", market.id))
                    onsubmit="return confirm('Are you sure you want to delete this market?')" {
                    button type="submit" class="danger" { "Delete Market" }
                }
            }
        }
    }
}
