// templates/pages/new_market.rs

use crate::auth::User;
use crate::domain::DraftListing;
use crate::templates::components::market_form::{
    address_fields, category_buttons, day_buttons, error_banner, form_base, location_panel,
};
use crate::templates::components::map_surface;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct NewMarketVm<'a> {
    pub user: &'a User,
    pub form_id: &'a str,
    pub draft: &'a DraftListing,
    pub error: Option<&'a str>,
    pub maps_api_key: Option<&'a str>,
}

pub fn new_market_page(vm: &NewMarketVm<'_>) -> Markup {
    let base = form_base(vm.form_id);
    let draft = vm.draft;
    let field_url = format!("{base}/field");
    let click_url = format!("{base}/map-click");

    desktop_layout(
        "Add Market",
        Some(vm.user),
        html! {
            main class="container" {
                h1 { "Add New Market" }

                form class="card" hx-post=(format!("{base}/submit"))
                    hx-target="#form-error" hx-swap="outerHTML" {
                    (error_banner(vm.error))

                    div class="field" {
                        label for="name" { "Market Name" }
                        input type="text" id="name" name="name" value=(draft.name) required
                            hx-post=(field_url) hx-trigger="input changed" hx-params="name" hx-swap="none";
                    }

                    div class="field" {
                        label for="description" { "Description" }
                        textarea id="description" name="description" rows="3" required
                            hx-post=(field_url) hx-trigger="input changed" hx-params="description" hx-swap="none" {
                            (draft.description)
                        }
                    }

                    (address_fields(vm.form_id, &draft.address))

                    div class="field" {
                        label { "Location (click the map to choose)" }
                        (map_surface(vm.maps_api_key, &[], Some(click_url.as_str())))
                        (location_panel(vm.form_id, draft.coordinate, false))
                    }

                    div class="field" {
                        label { "Operating Days" }
                        (day_buttons(vm.form_id, &draft.operating_days))
                    }

                    div class="field" {
                        label for="startTime" { "Opening Time" }
                        input type="time" id="startTime" name="startTime"
                            value=(draft.opening_time.format("%H:%M"))
                            hx-post=(field_url) hx-trigger="change" hx-params="startTime" hx-swap="none";
                    }

                    div class="field" {
                        label for="endTime" { "Closing Time" }
                        input type="time" id="endTime" name="endTime"
                            value=(draft.closing_time.format("%H:%M"))
                            hx-post=(field_url) hx-trigger="change" hx-params="endTime" hx-swap="none";
                    }

                    div class="field" {
                        label { "Categories" }
                        (category_buttons(vm.form_id, &draft.categories))
                    }

                    button type="submit" class="primary" { "Add Market" }
                }
            }
        },
    )
}
