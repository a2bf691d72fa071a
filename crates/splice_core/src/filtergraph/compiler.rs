//! Overlay filtergraph for the final render.
//!
//! Two optional stages, chained in this order:
//! 1. Banner track composited bottom-left, enabled only inside its windows.
//! 2. Moving logo animated on a transparent full-frame canvas, optionally
//!    blurred with `tmix`, then composited once.

use super::motion::MotionPath;
use super::node::{Filter, FilterChain, FilterGraph, GraphClause};
use crate::config::OverlaySettings;
use crate::logging::Diagnostics;
use crate::models::TargetParams;
use crate::planner::BannerWindow;

pub const BANNER_OUTPUT: &str = "v_banner_out";
pub const CANVAS_LABEL: &str = "transparent_canvas";
pub const LOGO_OUTPUT: &str = "v_moving_out";

/// Banner track input and the windows it must be visible in.
#[derive(Debug, Clone, Copy)]
pub struct BannerOverlay<'a> {
    pub input: usize,
    pub windows: &'a [BannerWindow],
}

#[derive(Debug, Clone, Copy)]
pub struct LogoOverlay {
    pub input: usize,
}

/// Everything the overlay stages need.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRequest<'a> {
    /// Stream the first stage reads, e.g. `0:v:0`.
    pub base_video: &'a str,
    pub target: &'a TargetParams,
    pub final_duration: f64,
    pub banner: Option<BannerOverlay<'a>>,
    pub logo: Option<LogoOverlay>,
    pub settings: &'a OverlaySettings,
}

/// Filtergraph plus the label carrying the composited video.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    pub graph: FilterGraph,
    pub video_output: String,
}

/// Build the overlay graph, or `None` when neither stage applies.
pub fn compile_overlays(request: &OverlayRequest<'_>, diag: &mut Diagnostics) -> Option<CompiledGraph> {
    let mut graph = FilterGraph::new();
    let mut current = request.base_video.to_string();

    if let Some(banner) = request.banner {
        match banner_clause(&current, banner) {
            Some(clause) => {
                graph.push(clause);
                current = BANNER_OUTPUT.to_string();
                diag.debug(format!(
                    "Banner overlay enabled in {} window(s)",
                    banner.windows.len()
                ));
            }
            None => diag.warn("Banner overlay has no windows, not added"),
        }
    }

    if let Some(logo) = request.logo {
        push_logo_clauses(&mut graph, &current, logo, request, diag);
        current = LOGO_OUTPUT.to_string();
    }

    if graph.is_empty() {
        None
    } else {
        Some(CompiledGraph {
            graph,
            video_output: current,
        })
    }
}

/// `enable` expression: OR of `between` tests over every window.
pub fn enable_expression(windows: &[BannerWindow]) -> String {
    windows
        .iter()
        .map(|w| format!("between(t,{:.3},{:.3})", w.start, w.end))
        .collect::<Vec<_>>()
        .join("+")
}

fn banner_clause(current: &str, banner: BannerOverlay<'_>) -> Option<GraphClause> {
    if banner.windows.is_empty() {
        return None;
    }
    let overlay = Filter::new("overlay")
        .opt("x", "0")
        .opt("y", "main_h-overlay_h")
        .opt_quoted("enable", enable_expression(banner.windows))
        .opt("shortest", "0");

    Some(GraphClause::new(
        [current.to_string(), format!("{}:v", banner.input)],
        FilterChain::new().with(overlay),
        BANNER_OUTPUT,
    ))
}

fn push_logo_clauses(
    graph: &mut FilterGraph,
    current: &str,
    logo: LogoOverlay,
    request: &OverlayRequest<'_>,
    diag: &mut Diagnostics,
) {
    let target = request.target;
    let settings = request.settings;

    let canvas = FilterChain::new()
        .with(
            Filter::new("color")
                .opt("c", "black@0.0")
                .opt("s", format!("{}x{}", target.width, target.height))
                .opt("r", target.fps)
                .opt("d", format!("{:.6}", request.final_duration)),
        )
        .with(Filter::new("format").arg("rgba"));
    graph.push(GraphClause::new(Vec::<String>::new(), canvas, CANVAS_LABEL));

    let logo_height = ((f64::from(target.height) * settings.logo_relative_height).floor() as i64).max(1);
    graph.push(GraphClause::new(
        [format!("{}:v", logo.input)],
        FilterChain::new()
            .with(Filter::new("scale").arg(-1).arg(logo_height).opt("flags", "bicubic"))
            .with(Filter::new("setsar").opt("sar", target.sar_filter_value())),
        "logo_scaled",
    ));

    let alpha = settings.logo_alpha.clamp(0.0, 1.0);
    graph.push(GraphClause::new(
        ["logo_scaled"],
        FilterChain::new()
            .with(Filter::new("format").opt("pix_fmts", "rgba"))
            .with(Filter::new("colorchannelmixer").opt("aa", format!("{:.3}", alpha))),
        "logo_prepared",
    ));

    let path = MotionPath::rectangular(request.final_duration, settings.moving_speed);
    if path.is_animated() {
        diag.debug(format!("Logo cycles the frame every {:.2}s", path.cycle()));
    } else {
        diag.warn(format!(
            "Logo cycle of {:.3}s is too short to animate, logo stays at the top-left corner",
            path.cycle()
        ));
    }
    graph.push(GraphClause::new(
        [CANVAS_LABEL, "logo_prepared"],
        FilterChain::new().with(
            Filter::new("overlay")
                .opt_quoted("x", path.x_expr())
                .opt_quoted("y", path.y_expr())
                .opt("shortest", "0"),
        ),
        "logo_anim",
    ));

    let mut layer = "logo_anim";
    if settings.motion_blur {
        let frames = path.blur_frames(
            settings.blur_intensity,
            target.fps.as_f64(),
            target.width,
            target.height,
        );
        if frames > 1 {
            graph.push(GraphClause::new(
                ["logo_anim"],
                FilterChain::new().with(Filter::new("tmix").opt("frames", frames)),
                "logo_blurred",
            ));
            layer = "logo_blurred";
            diag.debug(format!("Logo motion blur over {} frames", frames));
        } else {
            diag.debug("Logo moves too slowly for motion blur, skipped");
        }
    }

    graph.push(GraphClause::new(
        [current, layer],
        FilterChain::new().with(
            Filter::new("overlay")
                .opt("x", "0")
                .opt("y", "0")
                .opt("shortest", "0"),
        ),
        LOGO_OUTPUT,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rational;

    fn target() -> TargetParams {
        TargetParams {
            width: 1280,
            height: 720,
            pix_fmt: "yuv420p".to_string(),
            sar: Rational::new(1, 1),
            fps: Rational::new(25, 1),
            video_timebase: Rational::new(1, 12800),
            video_timescale: 12800,
            audio: None,
        }
    }

    fn request<'a>(
        target: &'a TargetParams,
        settings: &'a OverlaySettings,
        banner: Option<BannerOverlay<'a>>,
        logo: Option<LogoOverlay>,
    ) -> OverlayRequest<'a> {
        OverlayRequest {
            base_video: "0:v:0",
            target,
            final_duration: 110.0,
            banner,
            logo,
            settings,
        }
    }

    #[test]
    fn no_stages_no_graph() {
        let target = target();
        let settings = OverlaySettings::default();
        let req = request(&target, &settings, None, None);
        assert!(compile_overlays(&req, &mut Diagnostics::new()).is_none());
    }

    #[test]
    fn banner_overlay_gates_on_windows() {
        let target = target();
        let settings = OverlaySettings::default();
        let windows = [
            BannerWindow { start: 10.0, end: 15.0 },
            BannerWindow { start: 70.0, end: 75.0 },
        ];
        let req = request(
            &target,
            &settings,
            Some(BannerOverlay { input: 2, windows: &windows }),
            None,
        );

        let compiled = compile_overlays(&req, &mut Diagnostics::new()).unwrap();
        assert_eq!(compiled.video_output, BANNER_OUTPUT);
        assert_eq!(
            compiled.graph.to_string(),
            "[0:v:0][2:v]overlay=x=0:y=main_h-overlay_h:\
             enable='between(t,10.000,15.000)+between(t,70.000,75.000)':shortest=0[v_banner_out]"
        );
    }

    #[test]
    fn empty_banner_windows_are_skipped() {
        let target = target();
        let settings = OverlaySettings::default();
        let req = request(&target, &settings, Some(BannerOverlay { input: 1, windows: &[] }), None);
        let mut diag = Diagnostics::new();
        assert!(compile_overlays(&req, &mut diag).is_none());
        assert!(diag.has_warnings());
    }

    #[test]
    fn logo_stage_builds_canvas_and_layer() {
        let target = target();
        let settings = OverlaySettings::default();
        let req = request(&target, &settings, None, Some(LogoOverlay { input: 1 }));

        let compiled = compile_overlays(&req, &mut Diagnostics::new()).unwrap();
        let graph = &compiled.graph;
        assert_eq!(compiled.video_output, LOGO_OUTPUT);

        assert_eq!(
            graph.clause(CANVAS_LABEL).unwrap().to_string(),
            "color=c=black@0.0:s=1280x720:r=25:d=110.000000,format=rgba[transparent_canvas]"
        );
        // 720 / 12 = 60
        assert_eq!(
            graph.clause("logo_scaled").unwrap().to_string(),
            "[1:v]scale=-1:60:flags=bicubic,setsar=sar=1/1[logo_scaled]"
        );
        assert_eq!(
            graph.clause("logo_prepared").unwrap().to_string(),
            "[logo_scaled]format=pix_fmts=rgba,colorchannelmixer=aa=0.500[logo_prepared]"
        );
        let anim = graph.clause("logo_anim").unwrap();
        assert_eq!(anim.inputs, vec![CANVAS_LABEL, "logo_prepared"]);
        assert!(anim.to_string().contains("x='if(lt(mod(t,55.000000)"));
        assert_eq!(
            graph.clause(LOGO_OUTPUT).unwrap().to_string(),
            "[0:v:0][logo_anim]overlay=x=0:y=0:shortest=0[v_moving_out]"
        );
        assert!(graph.clause("logo_blurred").is_none());
    }

    #[test]
    fn stages_chain_banner_then_logo() {
        let target = target();
        let settings = OverlaySettings::default();
        let windows = [BannerWindow { start: 1.0, end: 2.0 }];
        let req = request(
            &target,
            &settings,
            Some(BannerOverlay { input: 1, windows: &windows }),
            Some(LogoOverlay { input: 2 }),
        );

        let compiled = compile_overlays(&req, &mut Diagnostics::new()).unwrap();
        let last = compiled.graph.clause(LOGO_OUTPUT).unwrap();
        assert_eq!(last.inputs, vec![BANNER_OUTPUT, "logo_anim"]);
        assert_eq!(compiled.graph.clauses()[0].output, BANNER_OUTPUT);
    }

    #[test]
    fn alpha_is_clamped_and_blur_applied() {
        let target = target();
        let settings = OverlaySettings {
            logo_alpha: 3.0,
            motion_blur: true,
            blur_intensity: 40.0,
            ..OverlaySettings::default()
        };
        let req = request(&target, &settings, None, Some(LogoOverlay { input: 1 }));

        let compiled = compile_overlays(&req, &mut Diagnostics::new()).unwrap();
        let graph = &compiled.graph;
        assert!(graph
            .clause("logo_prepared")
            .unwrap()
            .to_string()
            .contains("aa=1.000"));
        // cycle 55 s, 1280 px per 27.5 s; 40 * 5 * 25 / 46.545 ≈ 107
        assert_eq!(
            graph.clause("logo_blurred").unwrap().to_string(),
            "[logo_anim]tmix=frames=107[logo_blurred]"
        );
        assert_eq!(graph.clause(LOGO_OUTPUT).unwrap().inputs[1], "logo_blurred");
    }

    #[test]
    fn static_logo_is_pinned() {
        let target = target();
        let settings = OverlaySettings {
            moving_speed: 1000.0,
            motion_blur: true,
            ..OverlaySettings::default()
        };
        let req = request(&target, &settings, None, Some(LogoOverlay { input: 1 }));

        let mut diag = Diagnostics::new();
        let compiled = compile_overlays(&req, &mut diag).unwrap();
        assert_eq!(
            compiled.graph.clause("logo_anim").unwrap().to_string(),
            "[transparent_canvas][logo_prepared]overlay=x='0':y='0':shortest=0[logo_anim]"
        );
        assert!(compiled.graph.clause("logo_blurred").is_none());
        assert!(diag.has_warnings());
    }
}
