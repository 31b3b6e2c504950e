//! Scripted end-to-end demo: a static page, two section behaviors, and a
//! logging animation driver driven through discovery, batched reveals, and
//! one simulated page transition.
//!
//! Run with: `cargo run --example scripted_page`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use revelar::{
    AnimateOptions, AnimationDriver, BatchConfig, BatchStrategy, EngineConfig, IntersectionEntry,
    Keyframes, RevealContext, Revelar, RevelarResult, Section, SectionNode, SectionRegistry,
    StaticPage, Viewport, DEFAULT_SECTION_SELECTOR,
};

/// Driver that logs every animation instead of rendering one.
struct LoggingDriver;

#[async_trait]
impl AnimationDriver for LoggingDriver {
    async fn animate(
        &self,
        target: &SectionNode,
        keyframes: &Keyframes,
        options: &AnimateOptions,
    ) -> RevelarResult<()> {
        let duration = options.duration.unwrap_or(0.2);
        println!(
            "  [driver] animate {} {} ({duration:.2}s)",
            target.section_name(),
            keyframes
        );
        tokio::time::sleep(Duration::from_secs_f64(duration)).await;
        Ok(())
    }
}

/// Simple fade-up hero.
struct HeroSection;

#[async_trait]
impl Section for HeroSection {
    async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()> {
        ctx.animator
            .animate(
                &ctx.node,
                &json!({ "opacity": [0, 1], "y": [24, 0] }),
                &AnimateOptions::new().with_duration(0.3),
            )
            .await
    }
}

/// Card grid staggering its children.
struct CardGridSection {
    cards: Vec<SectionNode>,
}

#[async_trait]
impl Section for CardGridSection {
    async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()> {
        ctx.animator
            .stagger(
                &self.cards,
                &json!({ "opacity": [0, 1] }),
                &AnimateOptions::new().with_duration(0.15),
                Some(0.05),
            )
            .await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> RevelarResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter("revelar=debug")
        .init();

    let mut sections = SectionRegistry::new();
    sections
        .register("hero", |_node| Box::new(HeroSection))
        .register("CardGridSection", |_node| {
            Box::new(CardGridSection {
                cards: (0..3).map(|i| SectionNode::new(format!("card-{i}"))).collect(),
            })
        });

    let viewport = Arc::new(Viewport::new(800.0));
    let engine = Revelar::new(
        EngineConfig::new()
            .with_sections(sections)
            .with_viewport(Arc::clone(&viewport))
            .with_driver(Arc::new(LoggingDriver))
            .with_batch(
                BatchConfig::new()
                    .with_strategy(BatchStrategy::TopToBottom)
                    .with_delay_step_ms(100),
            ),
    )?;

    engine.on_reveal(|event| println!("  [event] revealed {} (index {})", event.name, event.index));
    engine.on_top_visible_change(|top| match top {
        Some(instance) => println!("  [event] top visible: {}", instance.name()),
        None => println!("  [event] top visible: none"),
    });

    // Page one: a hero above a card grid.
    let page = Arc::new(StaticPage::new());
    let hero = SectionNode::new("hero").with_top(0.0);
    let cards = SectionNode::new("card-grid").with_top(600.0);
    page.set_nodes(DEFAULT_SECTION_SELECTOR, vec![hero.clone(), cards.clone()]);

    println!("== initial discovery ==");
    engine.start(Arc::clone(&page) as Arc<dyn revelar::SectionSource>);

    println!("== scroll: both sections enter the viewport ==");
    engine.handle_intersections(&[
        IntersectionEntry::new(hero.id(), true, 0.5),
        IntersectionEntry::new(cards.id(), true, 0.2),
    ]);
    tokio::time::sleep(Duration::from_millis(800)).await;

    println!("== page transition ==");
    // destroy_all detaches listeners along with the pass; re-register for
    // the next page.
    engine.discovery().destroy_all();
    let next_hero = SectionNode::new("hero").with_top(0.0).with_reveal_time("0.1");
    page.set_nodes(DEFAULT_SECTION_SELECTOR, vec![next_hero.clone()]);
    engine.discovery().discover(page.as_ref(), false);
    engine.on_reveal(|event| println!("  [event] revealed {} (index {})", event.name, event.index));

    engine.handle_intersections(&[IntersectionEntry::new(next_hero.id(), true, 1.0)]);
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("== done ==");
    Ok(())
}
