//! Logo carousel: fills `.logos-track` with back-to-back copies of the
//! partner list so a CSS marquee can loop without a visible seam.

use tracing::debug;

use crate::config::CarouselConfig;
use crate::effect::{Effect, EffectCx};
use crate::host::{ElementId, Host};
use crate::marker::Marker;

/// Set on the track once populated; a second activation leaves it alone.
pub const READY_ATTR: &str = "data-carousel-ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerKind {
    Partner,
    Investor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partner {
    pub name: &'static str,
    pub image: &'static str,
    pub kind: PartnerKind,
}

const fn partner(name: &'static str, image: &'static str, kind: PartnerKind) -> Partner {
    Partner { name, image, kind }
}

pub const PARTNERS: [Partner; 10] = [
    partner("Partner 1", "assets/img/partner1.png", PartnerKind::Partner),
    partner("Partner 2", "assets/img/partner2.png", PartnerKind::Investor),
    partner("Partner 3", "assets/img/partner3.png", PartnerKind::Partner),
    partner("Partner 4", "assets/img/partner4.png", PartnerKind::Investor),
    partner("Partner 5", "assets/img/partner5.png", PartnerKind::Partner),
    partner("Partner 6", "assets/img/partner6.png", PartnerKind::Partner),
    partner("Partner 7", "assets/img/partner7.png", PartnerKind::Investor),
    partner("Partner 8", "assets/img/partner8.png", PartnerKind::Partner),
    partner("Partner 9", "assets/img/partner9.png", PartnerKind::Partner),
    partner("Partner 10", "assets/img/partner10.png", PartnerKind::Investor),
];

/// Build one `div.logo-item` for `partner`.
pub fn logo_item(host: &mut dyn Host, partner: &Partner, config: &CarouselConfig) -> ElementId {
    let item = host.create_element("div");
    host.add_class(item, "logo-item");

    let img = host.create_element("img");
    host.set_attribute(img, "src", partner.image);
    host.set_attribute(img, "alt", &format!("{} logo", partner.name));
    host.set_attribute(img, "title", partner.name);
    host.set_attribute(img, "loading", "lazy");
    host.append_child(item, img);

    if partner.kind == PartnerKind::Investor {
        let badge = host.create_element("span");
        host.add_class(badge, "investor-badge");
        host.set_text(badge, &config.badge_label);
        host.append_child(item, badge);
    }
    item
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogoCarousel;

impl Effect for LogoCarousel {
    fn name(&self) -> &'static str {
        "carousel"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let Some(track) = cx.host.query(Marker::LogosTrack) else {
            return;
        };
        if cx.host.attribute(track, READY_ATTR).is_some() {
            debug!("logo track already populated");
            return;
        }

        let config = &cx.config.carousel;
        for _ in 0..config.copies {
            for partner in &PARTNERS {
                let item = logo_item(cx.host, partner, config);
                cx.host.append_child(track, item);
            }
        }
        cx.host.set_attribute(track, READY_ATTR, "");
        debug!(items = config.copies * PARTNERS.len(), "logo track populated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_investors_in_the_list() {
        let investors: Vec<&str> = PARTNERS
            .iter()
            .filter(|p| p.kind == PartnerKind::Investor)
            .map(|p| p.name)
            .collect();
        assert_eq!(investors, ["Partner 2", "Partner 4", "Partner 7", "Partner 10"]);
    }

    #[test]
    fn images_follow_partner_numbering() {
        for (i, p) in PARTNERS.iter().enumerate() {
            assert_eq!(p.name, format!("Partner {}", i + 1));
            assert_eq!(p.image, format!("assets/img/partner{}.png", i + 1));
        }
    }
}
