// templates/components/map.rs
use maud::{html, Markup, PreEscaped};
use serde::Serialize;

use crate::domain::Coordinate;

/// Amsterdam centre.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 52.3676,
    lng: 4.9041,
};
pub const DEFAULT_ZOOM: u8 = 11;

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub position: Coordinate,
    pub title: String,
}

pub fn markers_json(markers: &[MapMarker]) -> String {
    serde_json::to_string(markers).unwrap_or_else(|_| "[]".to_string())
}

// Re-places pins whenever a swapped-in element carries `data-markers`.
const MAP_SCRIPT: &str = r#"
function initMarketMap() {
  var el = document.getElementById('market-map');
  if (!el) return;
  var map = new google.maps.Map(el, {
    center: { lat: parseFloat(el.dataset.lat), lng: parseFloat(el.dataset.lng) },
    zoom: parseInt(el.dataset.zoom, 10)
  });
  var pins = [];
  function place(markers) {
    pins.forEach(function (p) { p.setMap(null); });
    pins = markers.map(function (m) {
      return new google.maps.Marker({ position: m.position, title: m.title, map: map });
    });
  }
  place(JSON.parse(el.dataset.markers || '[]'));
  if (el.dataset.clickUrl) {
    map.addListener('click', function (e) {
      htmx.ajax('POST', el.dataset.clickUrl, {
        target: '#address-fields',
        swap: 'outerHTML',
        values: { lat: e.latLng.lat(), lng: e.latLng.lng() }
      });
    });
  }
  document.body.addEventListener('htmx:afterSettle', function () {
    var panel = document.getElementById('location-panel');
    if (panel && panel.dataset.markers) place(JSON.parse(panel.dataset.markers));
  });
}
"#;

/// Google map showing `markers`. When `click_url` is set, clicks post the
/// coordinate there and swap the returned address fields into the page.
///
/// Without an API key a placeholder is rendered instead.
pub fn map_surface(api_key: Option<&str>, markers: &[MapMarker], click_url: Option<&str>) -> Markup {
    let Some(key) = api_key else {
        return html! {
            div class="map card" id="market-map-disabled" {
                p { "The map is unavailable right now." }
            }
        };
    };

    let loader = format!(
        "https://maps.googleapis.com/maps/api/js?key={}&callback=initMarketMap",
        url::form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>()
    );

    html! {
        div class="map" id="market-map"
            data-lat=(DEFAULT_CENTER.lat)
            data-lng=(DEFAULT_CENTER.lng)
            data-zoom=(DEFAULT_ZOOM)
            data-markers=(markers_json(markers))
            data-click-url=[click_url] {}
        script { (PreEscaped(MAP_SCRIPT)) }
        script src=(loader) async defer {}
    }
}
