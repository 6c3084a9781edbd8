use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use tokio::time::{interval, Interval, MissedTickBehavior};

use glidepath_core::{
    CallValue, DeviceContext, ElementId, ScrollConfig, ScrollController, ScrollMode, ScrollTarget,
    ScrollToOptions, Vec2, Way,
};

use crate::layout::Layout;
use crate::sim::{PageScroll, SimElement, SimViewport};
use crate::SimulateArgs;

/// Upper bound on frames spent settling on a single step
const MAX_SETTLE_FRAMES: usize = 600;

type Controller = ScrollController<SimElement, SimViewport>;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Record<'a> {
    Call {
        element: ElementId,
        name: &'a str,
        way: Way,
        value: &'a CallValue,
        progress: f64,
    },
    Scroll {
        offset: Vec2,
        #[serde(skip_serializing_if = "Option::is_none")]
        speed: Option<f64>,
    },
    Summary {
        element: ElementId,
        name: &'a str,
        in_view: bool,
        progress: f64,
        classes: Vec<String>,
    },
}

fn emit(json: bool, record: &Record<'_>) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }

    match record {
        Record::Call {
            name,
            way,
            value,
            progress,
            ..
        } => println!(
            "[call]   {:<5} {} -> {} (progress {:.3})",
            way.to_string(),
            name,
            value,
            progress
        ),
        Record::Scroll { offset, speed } => match speed {
            Some(speed) => println!("[scroll] x={:.1} y={:.1} speed={:.1}", offset.x, offset.y, speed),
            None => println!("[scroll] x={:.1} y={:.1}", offset.x, offset.y),
        },
        Record::Summary {
            name,
            in_view,
            progress,
            classes,
            ..
        } => {
            let state = if *in_view { "in view" } else { "out of view" };
            println!(
                "  {} - {} (progress {:.3}) [{}]",
                name,
                state,
                progress,
                classes.join(" ")
            );
        }
    }
    Ok(())
}

/// Register every layout element with a fresh controller
fn build(
    layout: &Layout,
    config: ScrollConfig,
    context: DeviceContext,
    mode: ScrollMode,
    scroll: &PageScroll,
) -> (Controller, Vec<ElementId>) {
    let viewport = SimViewport::new(layout.viewport, layout.document_size());
    let mut controller = ScrollController::new(config, context, mode, viewport);

    let ids = layout
        .elements
        .iter()
        .map(|item| {
            let element = SimElement::new(
                item.label(),
                item.bounds(layout.viewport.width),
                scroll.clone(),
            );
            controller.register_element(element, item.element_config())
        })
        .collect();

    (controller, ids)
}

/// Steps the controller on a synthetic clock, optionally paced in real time
struct Driver {
    controller: Controller,
    scroll: PageScroll,
    clock: Instant,
    frame_interval: Duration,
    pacer: Option<Interval>,
    frames: usize,
}

impl Driver {
    fn new(controller: Controller, scroll: PageScroll, fps: u32) -> Self {
        let frame_interval = controller.config().animation.frame_interval();
        let pacer = (fps > 0).then(|| {
            let mut pacer = interval(Duration::from_millis(1000 / fps as u64));
            pacer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            pacer
        });

        Self {
            controller,
            scroll,
            clock: Instant::now(),
            frame_interval,
            pacer,
            frames: 0,
        }
    }

    async fn frame(&mut self) {
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.tick().await;
        }
        self.clock += self.frame_interval;
        self.controller.frame(self.clock);
        self.scroll.set(self.controller.state().offset);
        self.frames += 1;
    }

    /// Run frames until the offset rests on `goal`
    async fn settle(&mut self, goal: f64) {
        for _ in 0..MAX_SETTLE_FRAMES {
            self.frame().await;
            if self.controller.state().position() == goal && !self.controller.is_animating() {
                return;
            }
        }
        tracing::warn!("Offset did not settle on {} within {} frames", goal, MAX_SETTLE_FRAMES);
    }

    /// Report a native scroll to `position` along the active axis
    fn scroll_along(&mut self, position: f64) {
        let state = self.controller.state();
        let mut target = state.offset;
        *target.along_mut(state.axis) = position;
        self.controller.native_scroll(target.x, target.y);
    }

    async fn step_to(&mut self, goal: f64, step: f64) {
        let step = step.abs().max(1.0);
        let mut position = self.controller.state().position();

        self.frame().await;
        while position < goal {
            position = (position + step).min(goal);
            self.scroll_along(position);
            self.settle(position).await;
        }
    }

    async fn animate_to(&mut self, goal: f64) {
        let now = self.clock;
        self.controller
            .scroll_to(ScrollTarget::Position(goal), ScrollToOptions::default(), now);
        self.settle(goal).await;
    }
}

pub async fn run(args: SimulateArgs, config: ScrollConfig) -> Result<()> {
    let layout = Layout::load(&args.layout)?;
    let json = args.json;

    let scroll: PageScroll = Rc::new(Cell::new(Vec2::ZERO));
    let (mut controller, ids) = build(
        &layout,
        config,
        args.context.into(),
        args.mode.into(),
        &scroll,
    );
    tracing::info!("Registered {} elements", ids.len());

    if controller.activate() {
        tracing::debug!("Applied {}", controller.config().init_class);
    }

    controller.on_call(move |value, way, tracked| {
        emit(
            json,
            &Record::Call {
                element: tracked.id(),
                name: tracked.element().label(),
                way,
                value,
                progress: tracked.progress(),
            },
        )
    });
    if args.scroll_events {
        controller.on_scroll(move |state| {
            emit(
                json,
                &Record::Scroll {
                    offset: state.offset,
                    speed: state.speed,
                },
            )
        });
    }
    controller.start();

    let mut driver = Driver::new(controller, scroll, args.fps.unwrap_or(0));
    let max = driver.controller.state().max_position();
    let goal = args.to.unwrap_or(max).clamp(0.0, max);

    if args.animate {
        driver.animate_to(goal).await;
    } else {
        driver.step_to(goal, args.step).await;
    }

    if !json {
        println!("\nAfter {} frames at offset {:.1}:", driver.frames, driver.controller.state().position());
    }
    for tracked in driver.controller.engine().registry().iter() {
        emit(
            json,
            &Record::Summary {
                element: tracked.id(),
                name: tracked.element().label(),
                in_view: tracked.in_view(),
                progress: tracked.progress(),
                classes: tracked.element().classes(),
            },
        )?;
    }

    driver.controller.destroy();
    Ok(())
}
