//! Ark cards fetched from a lookup service: contact cards and weather.

use {serde_json::Value, tracing::debug};

use crate::{
    builders::{BuildContext, BuildOutcome, SegmentRequest},
    element::{ArkElement, MsgElement},
    error::{Error, Result},
};

pub(super) async fn contact(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["id"])?;
    let id = params.u64("id")?;
    let kind = match params.opt_str("type")? {
        Some(kind) => Some(kind),
        None => params.opt_str("kind")?,
    };

    let data = match kind.as_deref() {
        Some("private" | "qq") => ctx
            .services
            .contacts
            .share_private_card(id)
            .await
            .map_err(|e| Error::lookup(format!("contact card of {id}"), e))?,
        Some("group") => ctx
            .services
            .groups
            .share_group_card(id)
            .await
            .map_err(|e| Error::lookup(format!("card of group {id}"), e))?,
        _ => return Err(Error::invalid_parameter("type")),
    };

    Ok(MsgElement::Ark(ArkElement { data }).into())
}

/// Payload inside a weather card document.
fn weather_share_data(card: &Value) -> Option<&Value> {
    card.get("weekStore")?.get("share")?.get("data")
}

pub(super) async fn weather(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    let code = match params.opt_i64("code")? {
        Some(code) => code,
        None => {
            params.require(&["city"])?;
            let city = params.str("city")?;
            let found = ctx
                .services
                .weather
                .search_city(&city)
                .await
                .map_err(|e| Error::lookup(format!("city {city}"), e))?;
            let first = found
                .into_iter()
                .next()
                .ok_or_else(|| Error::lookup(format!("city {city}"), "no matching city"))?;
            debug!(city = %city, adcode = first.adcode, name = %first.name, "resolved city");
            first.adcode
        },
    };

    let card = ctx
        .services
        .weather
        .fetch_weather_card(code)
        .await
        .map_err(|e| Error::lookup(format!("weather card {code}"), e))?;
    let data = weather_share_data(&card)
        .ok_or_else(|| Error::lookup(format!("weather card {code}"), "card has no share data"))?;

    Ok(MsgElement::Ark(ArkElement {
        data: data.to_string(),
    })
    .into())
}
