//! FFmpeg filter graph builders for clip rendering, audio mixing and
//! compose concatenation.

/// Fade in/out lengths for one clip, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSpec {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl FadeSpec {
    /// Fades of `requested` seconds, clamped to half of `clip_duration` so the
    /// in and out windows never overlap.
    pub fn clamped(requested: f64, clip_duration: f64) -> Self {
        let limit = (clip_duration / 2.0).max(0.0);
        let fade = requested.max(0.0).min(limit);
        Self {
            fade_in: fade,
            fade_out: fade,
        }
    }

    /// Start time of the fade-out within a clip of `clip_duration`.
    pub fn fade_out_start(&self, clip_duration: f64) -> f64 {
        (clip_duration - self.fade_out).max(0.0)
    }
}

/// Largest even-sized box with the source aspect ratio that fits inside
/// `max_width` x `max_height`. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (w, h, max_w, max_h) = (
        width.max(1) as u64,
        height.max(1) as u64,
        max_width.max(2) as u64,
        max_height.max(2) as u64,
    );
    let (fit_w, fit_h) = if w <= max_w && h <= max_h {
        (w, h)
    } else if w * max_h > h * max_w {
        // width is the binding side
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };
    (even_floor(fit_w as u32), even_floor(fit_h as u32))
}

/// Round down to an even value, minimum 2 (H.264 with yuv420p needs even sizes).
pub fn even_floor(v: u32) -> u32 {
    (v - v % 2).max(2)
}

/// Filter for one still-image clip: exact scale, then fades.
pub fn still_clip_filter(width: u32, height: u32, fade: &FadeSpec, duration: f64) -> String {
    let mut chain = format!("scale={}:{},setsar=1,format=yuv420p", width, height);
    if fade.fade_in > 0.0 {
        chain.push_str(&format!(",fade=t=in:st=0:d={:.3}", fade.fade_in));
    }
    if fade.fade_out > 0.0 {
        chain.push_str(&format!(
            ",fade=t=out:st={:.3}:d={:.3}",
            fade.fade_out_start(duration),
            fade.fade_out
        ));
    }
    chain
}

/// Mix graph: input 0 is the voiceover, input 1 the background track.
///
/// The background is scaled by `volume` and cut to `[0, duration]`; the
/// voiceover passes through at full level (`normalize=0`).
pub fn background_mix_filter(volume: f64, duration: f64) -> String {
    format!(
        "[1:a]volume={:.2},atrim=start=0:end={:.6},asetpts=PTS-STARTPTS[bg];\
         [0:a][bg]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]",
        volume, duration
    )
}

/// Compose concatenation graph over inputs `0..clip_count`.
///
/// Every clip is centred on a `width` x `height` black canvas before the
/// concat, so clips of different sizes join into one uniform stream.
pub fn compose_concat_filter(clip_count: usize, width: u32, height: u32, fps: u32) -> String {
    let mut graph = String::new();
    for i in 0..clip_count {
        graph.push_str(&format!(
            "[{i}:v]pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps},format=yuv420p[v{i}];",
            i = i,
            w = width,
            h = height,
            fps = fps
        ));
    }
    for i in 0..clip_count {
        graph.push_str(&format!("[v{}]", i));
    }
    graph.push_str(&format!("concat=n={}:v=1:a=0[vout]", clip_count));
    graph
}
