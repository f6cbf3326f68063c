use std::collections::HashMap;

use serde::Deserialize;
use vizij_reveal_core::{
    AnimState, AttachCfg, Engine, Inputs, Rect, RevealCommand, RevealEvent, TriggerPolicy,
};
use vizij_test_fixtures::{pages, variants};

#[derive(Debug, Deserialize)]
struct Page {
    viewport: Rect,
    variants: String,
    targets: Vec<PageTarget>,
}

#[derive(Debug, Deserialize)]
struct PageTarget {
    handle: String,
    variant: String,
    #[serde(default)]
    bounds: Option<Rect>,
    #[serde(default)]
    policy: Option<TriggerPolicy>,
    #[serde(default)]
    children: Vec<PageChild>,
}

#[derive(Debug, Deserialize)]
struct PageChild {
    handle: String,
    variant: String,
}

fn load_page(name: &str) -> (Engine, Page) {
    let page: Page = pages::load(name).expect("page fixture");
    let mut engine = Engine::default();
    engine
        .load_variants_json(&variants::json(&page.variants).expect("variant fixture"))
        .expect("variants load");
    for t in &page.targets {
        let cfg = AttachCfg {
            variant: t.variant.as_str().into(),
            policy: t.policy,
            bounds: t.bounds,
            region: None,
        };
        engine.attach(&t.handle, cfg).expect("attach");
        for c in &t.children {
            engine
                .attach_child(&t.handle, &c.handle, c.variant.as_str().into())
                .expect("attach child");
        }
    }
    (engine, page)
}

#[derive(Default, Debug)]
struct Counts {
    enter: usize,
    exit: usize,
}

fn scroll(engine: &mut Engine, viewport: Rect, ys: impl IntoIterator<Item = f32>) -> HashMap<String, Counts> {
    let mut counts: HashMap<String, Counts> = HashMap::new();
    for y in ys {
        let vp = Rect { y, ..viewport };
        let out = engine.update(0.1, Inputs::with_viewport(vp));
        for ev in &out.events {
            match ev {
                RevealEvent::Enter { handle, .. } => counts.entry(handle.clone()).or_default().enter += 1,
                RevealEvent::Exit { handle, .. } => counts.entry(handle.clone()).or_default().exit += 1,
                _ => {}
            }
        }
    }
    counts
}

#[test]
fn construction_landing_scroll_down_and_back() {
    let (mut engine, page) = load_page("construction-landing");
    assert_eq!(engine.target_count(), 4 + 3 + 4);

    let down = (0..=23).map(|i| i as f32 * 100.0);
    let up = (0..=22).rev().map(|i| i as f32 * 100.0);
    let counts = scroll(&mut engine, page.viewport, down.chain(up));

    // No policy means repeat on any contact: out at y=700, back at y=600.
    let hero = &counts["hero"];
    assert_eq!((hero.enter, hero.exit), (2, 1), "hero: {hero:?}");
    for once in ["about", "about-title", "about-text", "about-cta", "contact"] {
        let c = &counts[once];
        assert_eq!((c.enter, c.exit), (1, 0), "{once}: {c:?}");
    }
    for repeat in ["services", "service-1", "service-2", "service-3", "service-4"] {
        let c = &counts[repeat];
        assert_eq!((c.enter, c.exit), (2, 2), "{repeat}: {c:?}");
    }

    // Let everything settle.
    for _ in 0..200 {
        engine.update(0.1, Inputs::default());
    }
    assert_eq!(engine.state("hero"), Some(AnimState::Visible));
    assert_eq!(engine.state("services"), Some(AnimState::Hidden));
    let contact = engine.style("contact").unwrap();
    assert_eq!(contact.get("scale"), Some(1.0));
    assert_eq!(contact.get("opacity"), Some(1.0));
}

#[test]
fn coffee_landing_springs_overshoot_then_settle() {
    let (mut engine, page) = load_page("coffee-landing");

    engine.update(0.0, Inputs::with_viewport(page.viewport));
    assert_eq!(engine.state("services-heading"), Some(AnimState::Hidden));

    let in_view = Rect {
        y: 300.0,
        ..page.viewport
    };
    let mut peak: f32 = 0.0;
    let mut heading_started_at = None;
    for frame in 0..180 {
        let out = engine.update(1.0 / 60.0, Inputs::with_viewport(in_view));
        let o = out
            .frame("services-heading")
            .and_then(|f| f.style.get("opacity"))
            .unwrap();
        if o > 0.0 && heading_started_at.is_none() {
            heading_started_at = Some(frame);
        }
        peak = peak.max(o);
    }
    assert!(peak > 1.0, "spring should overshoot, peak {peak}");
    // Delay of 0.2 s holds the heading hidden for the first dozen frames.
    assert!(heading_started_at.unwrap() >= 11);
    assert_eq!(engine.state("services-heading"), Some(AnimState::Visible));
    assert_eq!(engine.state("services-body"), Some(AnimState::Visible));
    assert_eq!(engine.style("services-body").unwrap().get("y"), Some(0.0));
}

#[test]
fn coffee_landing_menu_opens_and_closes_on_demand() {
    let (mut engine, page) = load_page("coffee-landing");
    assert!(!engine.is_observed("nav-menu"));

    let toggle = |vp: Rect| Inputs {
        viewport: Some(vp),
        commands: vec![RevealCommand::Toggle {
            handle: "nav-menu".into(),
        }],
        ..Inputs::default()
    };
    engine.update(0.016, toggle(page.viewport));
    assert_eq!(engine.state("nav-menu"), Some(AnimState::Entering));
    engine.update(0.3, Inputs::default());
    assert_eq!(engine.style("nav-menu").unwrap().get("x"), Some(0.0));

    engine.update(0.016, toggle(page.viewport));
    assert_eq!(engine.state("nav-menu"), Some(AnimState::Exiting));
    engine.update(0.3, Inputs::default());
    assert_eq!(engine.style("nav-menu").unwrap().get("x"), Some(-240.0));
}
