use anyhow::Result;

use glidepath_core::{DeviceContext, DeviceInfo, ScrollConfig};

pub fn run(
    config: &ScrollConfig,
    user_agent: String,
    width: f64,
    platform: String,
    touch_points: u32,
) -> Result<()> {
    let info = DeviceInfo {
        user_agent,
        platform,
        max_touch_points: touch_points,
        viewport_width: width,
    };
    let context = DeviceContext::detect(&info, config.tablet.breakpoint);

    println!("Context:   {}", context);
    println!("Mobile:    {}", context.is_mobile());
    println!("Direction: {:?}", config.direction_for(context));
    println!("Smooth:    {}", config.smooth_for(context));

    Ok(())
}
