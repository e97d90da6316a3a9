//! System faces, pokes and the two animated market stickers.

use crate::{
    builders::{BuildOutcome, SegmentRequest},
    element::{FACE_TYPE_POKE, FACE_TYPE_SYSTEM, FaceElement, MarketFaceElement, MsgElement, PokeDetails},
    error::{Error, Result},
    face_catalog,
};

const POKE_FALLBACK_TEXT: &str = "[截一戳]请使用最新版手机QQ体验新功能。";
const POKE_STRENGTH_ALIASES: [&str; 4] = ["strength", "cnt", "count", "time"];
const MAX_POKE_STRENGTH: i32 = 3;

pub(super) fn face(req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["id"])?;
    let id = req.params.i32("id")?;
    Ok(MsgElement::Face(FaceElement {
        face_index: id,
        face_text: face_catalog::description(id).to_string(),
        face_type: FACE_TYPE_SYSTEM,
        pack_id: Some("0".to_string()),
        poke: None,
    })
    .into())
}

pub(super) fn poke(req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["type", "id"])?;
    let poke_type = req.params.i32("type")?;
    let vaspoke_id = req.params.i32("id")?;
    let strength = poke_strength(req)?;
    Ok(MsgElement::Face(FaceElement {
        face_index: 0,
        face_text: String::new(),
        face_type: FACE_TYPE_POKE,
        pack_id: None,
        poke: Some(PokeDetails {
            poke_type,
            vaspoke_id,
            strength,
            fallback_text: POKE_FALLBACK_TEXT.to_string(),
        }),
    })
    .into())
}

/// First present alias wins; absent means 0.
fn poke_strength(req: &SegmentRequest) -> Result<i32> {
    let Some(name) = POKE_STRENGTH_ALIASES
        .into_iter()
        .find(|n| req.params.contains(n))
    else {
        return Ok(0);
    };
    let strength = req
        .params
        .i32(name)
        .map_err(|_| Error::invalid_parameter("strength"))?;
    if !(0..=MAX_POKE_STRENGTH).contains(&strength) {
        return Err(Error::invalid_parameter("strength"));
    }
    Ok(strength)
}

struct MarketSticker {
    package_id: i32,
    name: &'static str,
    emoji_id: &'static str,
    key: &'static str,
}

const DICE: MarketSticker = MarketSticker {
    package_id: 11464,
    name: "[骰子]",
    emoji_id: "4823d3adb15df08014ce5d6796b76ee1",
    key: "409e2a69b16918f9",
};

const RPS: MarketSticker = MarketSticker {
    package_id: 11415,
    name: "[猜拳]",
    emoji_id: "83C8A293AE65CA140F348120A77448EE",
    key: "7de39febcf45e6db",
};

fn market_face(sticker: &MarketSticker) -> MsgElement {
    MsgElement::MarketFace(MarketFaceElement {
        item_type: 6,
        face_info: 1,
        package_id: sticker.package_id,
        sub_type: 3,
        media_type: 0,
        width: 200,
        height: 200,
        face_name: sticker.name.to_string(),
        emoji_id: sticker.emoji_id.to_string(),
        key: sticker.key.to_string(),
        emoji_type: 1,
        support_size: vec![(200, 200)],
    })
}

pub(super) fn dice() -> MsgElement {
    market_face(&DICE)
}

pub(super) fn rps() -> MsgElement {
    market_face(&RPS)
}
