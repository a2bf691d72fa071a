//! Ad insertion timeline and original → adjusted time remapping.
//!
//! All adjusted times in a plan come from one [`TimelineMap`]. Banner windows,
//! the banner track layout and the final duration bound are derived from it
//! rather than recomputed.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::timecode::{format_timecode, parse_timecode};
use crate::config::PolicySettings;
use crate::logging::Diagnostics;
use crate::models::{BannerRequest, JobRequest, StreamDescriptor};
use crate::probe::MediaProbe;

/// Windows and segments at or below this length are discarded.
pub const TIME_EPSILON: f64 = 0.001;

/// One accepted ad insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdInsertion {
    pub source: PathBuf,
    /// Original-timeline insertion point in seconds.
    pub time: f64,
    /// Seconds the ad occupies in the output.
    pub duration: f64,
    pub descriptor: StreamDescriptor,
    /// The probe found no duration, so the input must be looped.
    pub is_still: bool,
}

/// Monotonic map from original seconds to adjusted (post-insertion) seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineMap {
    /// `(insertion time, inserted duration)` in ascending time order.
    insertions: Vec<(f64, f64)>,
}

impl TimelineMap {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build from ads already sorted by insertion time.
    pub fn from_insertions(ads: &[AdInsertion]) -> Self {
        debug_assert!(ads.windows(2).all(|w| w[0].time <= w[1].time));
        Self {
            insertions: ads.iter().map(|ad| (ad.time, ad.duration)).collect(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.insertions.is_empty()
    }

    /// Adjusted time for original time `t`.
    ///
    /// Every ad inserted at or before `t` pushes `t` later by its duration.
    pub fn map(&self, t: f64) -> f64 {
        let mut adjusted = 0.0;
        let mut previous = 0.0;
        for &(time, duration) in &self.insertions {
            if time > t {
                break;
            }
            adjusted += (time - previous) + duration;
            previous = time;
        }
        adjusted + (t - previous)
    }

    /// Total inserted seconds.
    pub fn inserted_duration(&self) -> f64 {
        self.insertions.iter().map(|&(_, d)| d).sum()
    }
}

/// Interval of the output timeline during which the banner is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BannerWindow {
    pub start: f64,
    pub end: f64,
}

impl BannerWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Accepted banner with its resolved windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerPlan {
    pub source: PathBuf,
    pub descriptor: Option<StreamDescriptor>,
    /// Seconds of one banner occurrence.
    pub duration: f64,
    pub is_still: bool,
    /// Non-overlapping, ascending.
    pub windows: Vec<BannerWindow>,
}

/// Result of timeline planning for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePlan {
    pub main_duration: f64,
    /// Accepted ads, ascending by time, ties in request order.
    pub ads: Vec<AdInsertion>,
    pub map: TimelineMap,
    pub final_duration: f64,
    pub banner: Option<BannerPlan>,
}

impl TimelinePlan {
    /// Ads force segment pre-rendering and concatenation.
    pub fn is_concat_mode(&self) -> bool {
        !self.ads.is_empty()
    }
}

/// Validates ad and banner requests against the main video.
pub struct TimelinePlanner<'a> {
    probe: &'a dyn MediaProbe,
    default_duration: f64,
}

impl<'a> TimelinePlanner<'a> {
    pub fn new(probe: &'a dyn MediaProbe, policy: &PolicySettings) -> Self {
        Self {
            probe,
            default_duration: policy.default_media_duration,
        }
    }

    pub fn plan(&self, job: &JobRequest, main_duration: f64, diag: &mut Diagnostics) -> TimelinePlan {
        let ads = self.resolve_ads(job, main_duration, diag);
        let map = TimelineMap::from_insertions(&ads);
        let final_duration = main_duration + ads.iter().map(|ad| ad.duration).sum::<f64>();

        if !ads.is_empty() {
            diag.info(format!(
                "{} ad(s) accepted, final duration {:.3}s",
                ads.len(),
                final_duration
            ));
        }

        let banner = job
            .banner
            .as_ref()
            .and_then(|req| self.resolve_banner(req, &map, final_duration, diag));

        TimelinePlan {
            main_duration,
            ads,
            map,
            final_duration,
            banner,
        }
    }

    fn resolve_ads(
        &self,
        job: &JobRequest,
        main_duration: f64,
        diag: &mut Diagnostics,
    ) -> Vec<AdInsertion> {
        let mut ads = Vec::new();

        for request in &job.ads {
            let Some(time) = parse_timecode(&request.timecode) else {
                diag.warn(format!(
                    "Skipping ad '{}': invalid timecode '{}'",
                    request.path.display(),
                    request.timecode
                ));
                continue;
            };
            if time >= main_duration {
                diag.warn(format!(
                    "Skipping ad '{}': {} is not before the end of the main video ({})",
                    request.path.display(),
                    request.timecode,
                    format_timecode(main_duration)
                ));
                continue;
            }
            if !self.probe.exists(&request.path) {
                diag.warn(format!("Skipping ad '{}': file not found", request.path.display()));
                continue;
            }
            let report = self.probe.report(&request.path).unwrap_or_default();
            let Some(descriptor) = report.descriptor.filter(|d| d.dimensions().is_some()) else {
                diag.warn(format!(
                    "Skipping ad '{}': no usable video stream",
                    request.path.display()
                ));
                continue;
            };

            let probed = report.duration;
            let duration = self.duration_or_default(&request.path, probed, descriptor.is_image, diag);

            ads.push(AdInsertion {
                source: request.path.clone(),
                time,
                duration,
                descriptor,
                is_still: probed.is_none(),
            });
        }

        // Stable: ads sharing a timecode keep their request order.
        ads.sort_by(|a, b| a.time.total_cmp(&b.time));
        ads
    }

    fn resolve_banner(
        &self,
        request: &BannerRequest,
        map: &TimelineMap,
        final_duration: f64,
        diag: &mut Diagnostics,
    ) -> Option<BannerPlan> {
        if !self.probe.exists(&request.path) {
            diag.warn(format!(
                "Banner '{}' not found, banner skipped",
                request.path.display()
            ));
            return None;
        }

        let times: Vec<f64> = request
            .timecodes
            .iter()
            .filter_map(|tc| {
                let parsed = parse_timecode(tc);
                if parsed.is_none() {
                    diag.warn(format!("Ignoring invalid banner timecode '{}'", tc));
                }
                parsed
            })
            .collect();

        let report = self.probe.report(&request.path).unwrap_or_default();
        let descriptor = report.descriptor;
        let probed = report.duration;
        let is_image = descriptor.as_ref().is_some_and(|d| d.is_image);
        let duration = self.duration_or_default(&request.path, probed, is_image, diag);

        let windows = banner_windows(&times, duration, map, final_duration, diag);
        if windows.is_empty() {
            diag.warn("No banner window falls inside the output, banner skipped");
            return None;
        }

        Some(BannerPlan {
            source: request.path.clone(),
            descriptor,
            duration,
            is_still: probed.is_none(),
            windows,
        })
    }

    fn duration_or_default(
        &self,
        path: &Path,
        probed: Option<f64>,
        is_image: bool,
        diag: &mut Diagnostics,
    ) -> f64 {
        match probed {
            Some(d) => d,
            None if is_image => {
                diag.info(format!(
                    "'{}' is a still image, showing it for {:.3}s",
                    path.display(),
                    self.default_duration
                ));
                self.default_duration
            }
            None => {
                diag.warn(format!(
                    "Could not probe duration of '{}', assuming {:.3}s",
                    path.display(),
                    self.default_duration
                ));
                self.default_duration
            }
        }
    }
}

/// Banner windows on the adjusted timeline.
///
/// Each original time `t` becomes `[map(t), min(map(t) + duration, final)]`.
/// Windows starting at or after the end, or no longer than [`TIME_EPSILON`],
/// are dropped. Overlapping windows are cut at the next window's start.
pub fn banner_windows(
    times: &[f64],
    banner_duration: f64,
    map: &TimelineMap,
    final_duration: f64,
    diag: &mut Diagnostics,
) -> Vec<BannerWindow> {
    let mut sorted = times.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut windows: Vec<BannerWindow> = Vec::new();
    for t in sorted {
        let start = map.map(t);
        let end = (start + banner_duration).min(final_duration);
        if start >= final_duration || end <= start + TIME_EPSILON {
            diag.warn(format!(
                "Banner at {} falls outside the output, dropped",
                format_timecode(t)
            ));
            continue;
        }
        windows.push(BannerWindow { start, end });
    }

    let mut result: Vec<BannerWindow> = Vec::with_capacity(windows.len());
    for (i, mut window) in windows.iter().copied().enumerate() {
        if let Some(next) = windows.get(i + 1) {
            if window.end > next.start {
                window.end = next.start;
                if window.end <= window.start + TIME_EPSILON {
                    diag.warn(format!(
                        "Banner window at {:.3}s is hidden by the next one, dropped",
                        window.start
                    ));
                    continue;
                }
                diag.debug(format!(
                    "Banner window at {:.3}s shortened to end at {:.3}s",
                    window.start, window.end
                ));
            }
        }
        result.push(window);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::{hd_descriptor, image_descriptor, FakeProbe};

    const EPS: f64 = 1e-9;

    fn ad(time: f64, duration: f64) -> AdInsertion {
        AdInsertion {
            source: PathBuf::from("ad.mp4"),
            time,
            duration,
            descriptor: hd_descriptor(),
            is_still: false,
        }
    }

    #[test]
    fn identity_without_ads() {
        let map = TimelineMap::identity();
        for t in [0.0, 1.5, 42.0, 1000.0] {
            assert_eq!(map.map(t), t);
        }
    }

    #[test]
    fn single_ad_example() {
        let map = TimelineMap::from_insertions(&[ad(30.0, 10.0)]);
        assert!((map.map(20.0) - 20.0).abs() < EPS);
        assert!((map.map(30.0) - 40.0).abs() < EPS);
        assert!((map.map(40.0) - 50.0).abs() < EPS);
        assert!((map.map(100.0) - 110.0).abs() < EPS);
    }

    #[test]
    fn offset_equals_inserted_durations() {
        let ads = [ad(5.0, 3.0), ad(5.0, 2.0), ad(20.0, 7.5), ad(61.0, 0.5)];
        let map = TimelineMap::from_insertions(&ads);

        let mut previous = f64::MIN;
        for step in 0..=800 {
            let t = step as f64 * 0.1;
            let adjusted = map.map(t);
            let expected: f64 = ads.iter().filter(|a| a.time <= t).map(|a| a.duration).sum();
            assert!((adjusted - t - expected).abs() < 1e-6, "t={t}");
            assert!(adjusted >= previous);
            previous = adjusted;
        }
        assert!((map.inserted_duration() - 13.0).abs() < EPS);
    }

    #[test]
    fn banner_windows_follow_the_map() {
        let map = TimelineMap::from_insertions(&[ad(30.0, 10.0)]);
        let mut diag = Diagnostics::new();
        let windows = banner_windows(&[60.0, 10.0], 5.0, &map, 110.0, &mut diag);

        assert_eq!(windows.len(), 2);
        assert!((windows[0].start - 10.0).abs() < EPS && (windows[0].end - 15.0).abs() < EPS);
        assert!((windows[1].start - 70.0).abs() < EPS && (windows[1].end - 75.0).abs() < EPS);
    }

    #[test]
    fn banner_windows_drop_out_of_range() {
        let map = TimelineMap::identity();
        let mut diag = Diagnostics::new();

        let windows = banner_windows(&[100.0, 99.9995, 98.0], 5.0, &map, 100.0, &mut diag);
        assert_eq!(windows, vec![BannerWindow { start: 98.0, end: 100.0 }]);
        assert_eq!(diag.warnings().count(), 2);

        let mut diag = Diagnostics::new();
        let windows = banner_windows(&[99.9995], 5.0, &map, 100.0, &mut diag);
        assert!(windows.is_empty());
    }

    #[test]
    fn overlapping_windows_are_truncated() {
        let map = TimelineMap::identity();
        let mut diag = Diagnostics::new();
        let windows = banner_windows(&[10.0, 12.0, 12.0], 5.0, &map, 100.0, &mut diag);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], BannerWindow { start: 10.0, end: 12.0 });
        assert_eq!(windows[1], BannerWindow { start: 12.0, end: 17.0 });
    }

    fn planner_probe() -> FakeProbe {
        FakeProbe::new()
            .with_media("ad_a.mp4", hd_descriptor(), Some(10.0))
            .with_media("ad_b.mp4", hd_descriptor(), Some(4.0))
            .with_media("still.png", image_descriptor(1280, 720), None)
            .with_unprobeable("broken.mp4")
            .with_media("banner.png", image_descriptor(1920, 200), None)
    }

    #[test]
    fn plans_ads_in_time_order() {
        let probe = planner_probe();
        let planner = TimelinePlanner::new(&probe, &PolicySettings::default());
        let job = JobRequest::new("main.mp4", "out.mp4")
            .with_ad("01:00", "ad_b.mp4")
            .with_ad("00:30", "ad_a.mp4")
            .with_ad("00:30", "still.png");

        let mut diag = Diagnostics::new();
        let plan = planner.plan(&job, 100.0, &mut diag);

        let order: Vec<_> = plan.ads.iter().map(|a| a.source.to_string_lossy().into_owned()).collect();
        assert_eq!(order, vec!["ad_a.mp4", "still.png", "ad_b.mp4"]);
        assert!(plan.ads[1].is_still);
        assert_eq!(plan.ads[1].duration, 5.0);
        assert_eq!(plan.final_duration, 100.0 + 10.0 + 5.0 + 4.0);
        assert!(plan.is_concat_mode());
    }

    #[test]
    fn skips_bad_ads_with_warnings() {
        let probe = planner_probe();
        let planner = TimelinePlanner::new(&probe, &PolicySettings::default());
        let job = JobRequest::new("main.mp4", "out.mp4")
            .with_ad("1:30:00", "ad_a.mp4")
            .with_ad("00:xx", "ad_a.mp4")
            .with_ad("00:10", "missing.mp4")
            .with_ad("00:20", "broken.mp4")
            .with_ad("01:40", "ad_a.mp4");

        let mut diag = Diagnostics::new();
        let plan = planner.plan(&job, 100.0, &mut diag);

        assert!(plan.ads.is_empty());
        assert!(!plan.is_concat_mode());
        assert_eq!(plan.final_duration, 100.0);
        assert_eq!(diag.warnings().count(), 5);
    }

    #[test]
    fn default_duration_is_configurable() {
        let probe = planner_probe();
        let policy = PolicySettings {
            default_media_duration: 2.5,
            ..PolicySettings::default()
        };
        let planner = TimelinePlanner::new(&probe, &policy);
        let job = JobRequest::new("main.mp4", "out.mp4").with_ad("00:05", "still.png");

        let plan = planner.plan(&job, 60.0, &mut Diagnostics::new());
        assert_eq!(plan.ads[0].duration, 2.5);
        assert_eq!(plan.final_duration, 62.5);
    }

    #[test]
    fn banner_uses_shared_map() {
        let probe = planner_probe();
        let planner = TimelinePlanner::new(&probe, &PolicySettings::default());
        let job = JobRequest::new("main.mp4", "out.mp4")
            .with_ad("00:30", "ad_a.mp4")
            .with_banner("banner.png", ["00:10", "01:00", "bogus"]);

        let mut diag = Diagnostics::new();
        let plan = planner.plan(&job, 100.0, &mut diag);
        let banner = plan.banner.unwrap();

        assert_eq!(banner.duration, 5.0);
        assert!(banner.is_still);
        assert_eq!(
            banner.windows,
            vec![
                BannerWindow { start: 10.0, end: 15.0 },
                BannerWindow { start: 70.0, end: 75.0 },
            ]
        );
        assert!(diag.warnings().any(|d| d.message.contains("bogus")));
    }

    #[test]
    fn each_file_is_probed_once() {
        let probe = planner_probe().with_unprobeable("broken_banner.png");
        let planner = TimelinePlanner::new(&probe, &PolicySettings::default());
        let job = JobRequest::new("main.mp4", "out.mp4")
            .with_ad("00:30", "ad_a.mp4")
            .with_ad("00:20", "broken.mp4")
            .with_banner("broken_banner.png", ["00:10"]);

        let mut diag = Diagnostics::new();
        let plan = planner.plan(&job, 100.0, &mut diag);

        // Unprobeable banner still shows for the default duration.
        let banner = plan.banner.unwrap();
        assert!(banner.descriptor.is_none());
        assert_eq!(banner.duration, 5.0);
        assert_eq!(probe.inspections("ad_a.mp4"), 1);
        assert_eq!(probe.inspections("broken.mp4"), 1);
        assert_eq!(probe.inspections("broken_banner.png"), 1);
    }

    #[test]
    fn missing_banner_is_skipped() {
        let probe = planner_probe();
        let planner = TimelinePlanner::new(&probe, &PolicySettings::default());
        let job = JobRequest::new("main.mp4", "out.mp4").with_banner("nope.png", ["00:10"]);

        let mut diag = Diagnostics::new();
        let plan = planner.plan(&job, 100.0, &mut diag);
        assert!(plan.banner.is_none());
        assert!(diag.has_warnings());
    }
}
