//! Basic example: bringing up the processor and the autofocus engine
//!
//! This example demonstrates:
//! - Building a processor over the simulated register block
//! - Enabling the pipeline with a RAW10 → YUV422 configuration
//! - Programming gamma and color correction
//! - Configuring an autofocus controller and reading its statistics

use embedded_isp::prelude::*;

fn main() {
    println!("=== Basic ISP Example ===\n");

    let isp = ProcessorBuilder::new()
        .registers(SimulatedIsp::new())
        .no_installer()
        .build();

    let config = ProcessorConfig {
        input_format: ColorFormat::Raw10,
        output_format: ColorFormat::Yuv422,
        frame: FrameSize::new(1920, 1080),
        ..Default::default()
    };
    isp.enable(&config).unwrap();
    println!("Processor state: {:?}", isp.state());

    // Gamma: lift the shadows, compress the highlights
    let curve = GammaCurve::from_fn(|x| (32 + x * 7 / 8).min(255) as u8);
    for channel in GammaChannel::ALL {
        isp.apply_gamma(channel, &curve).unwrap();
    }
    isp.set_gamma_enabled(true);
    println!("Gamma applied to all channels");

    // Color correction with saturation on overflow
    let ccm = CcmMatrix::new(
        [[1.6, -0.4, -0.2], [-0.3, 1.5, -0.2], [-0.1, -0.5, 1.6]],
        true,
    );
    isp.configure_ccm(&ccm).unwrap();
    isp.set_ccm_enabled(true);
    println!("CCM configured");

    // Autofocus: centre window, manual edge threshold
    let mut af = AfController::new(&isp, AfConfig::default()).unwrap();
    af.set_window(0, Point::new(760, 440), Point::new(1160, 640))
        .unwrap();
    af.set_edge_threshold_mode(EdgeThreshold::Manual(512)).unwrap();
    af.set_detector_mode(EnvDetectorMode::Ratio(0.25)).unwrap();
    af.enable().unwrap();
    println!("AF enabled, {} engine(s) registered", isp.ref_count());

    // Rejected input never reaches the registers
    match af.set_edge_threshold_mode(EdgeThreshold::Manual(0)) {
        Err(e) => println!("Rejected manual threshold 0: {e}"),
        Ok(()) => println!("Unexpectedly accepted"),
    }

    af.trigger_oneshot().unwrap();
    let stats = af.statistics();
    for (i, w) in stats.windows.iter().enumerate() {
        println!("Window {i}: sum={} lum={}", w.sum, w.lum);
    }

    af.disable().unwrap();
    drop(af);
    isp.disable().unwrap();
    println!("\nProcessor state: {:?}", isp.state());
}
