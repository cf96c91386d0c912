use super::{DrawCommand, Drawable, RenderError, Renderer};
use serde_derive::Serialize;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use tracing::trace;

#[derive(Serialize)]
struct Frame<'a> {
    frame: u64,
    width: f64,
    height: f64,
    commands: &'a [DrawCommand],
}

/// serializes every frame to json and hands it to whoever holds the receiving end.
/// the mailbox holds a single frame, if the consumer has not picked up the last one
/// the new one is dropped instead of slowing down the simulation.
pub struct ChannelRenderer {
    tx: SyncSender<String>,
    size: Option<(f64, f64)>,
    commands: Vec<DrawCommand>,
    frame: u64,
    dropped: u64,
}

pub fn channel() -> (ChannelRenderer, Receiver<String>) {
    let (tx, rx) = sync_channel(1);
    let r = ChannelRenderer {
        tx,
        size: None,
        commands: Vec::new(),
        frame: 0,
        dropped: 0,
    };
    (r, rx)
}

impl ChannelRenderer {
    /// frames the consumer was too slow for
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Renderer for ChannelRenderer {
    fn init(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        self.size = Some((width, height));
        Ok(())
    }

    fn start_frame(&mut self) -> Result<(), RenderError> {
        if self.size.is_none() {
            return Err(RenderError::NotInitialised);
        }
        self.commands.clear();
        Ok(())
    }

    fn draw(&mut self, d: &dyn Drawable) -> Result<(), RenderError> {
        self.commands.extend(d.web());
        Ok(())
    }

    fn finish_frame(&mut self) -> Result<(), RenderError> {
        let (width, height) = self.size.ok_or(RenderError::NotInitialised)?;
        let json = serde_json::to_string(&Frame {
            frame: self.frame,
            width,
            height,
            commands: &self.commands,
        })?;
        self.frame += 1;
        match self.tx.try_send(json) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                trace!(frame = self.frame, dropped = self.dropped, "consumer busy, frame dropped");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(RenderError::Disconnected),
        }
    }
}

#[cfg(test)]
struct Square;

#[cfg(test)]
impl Drawable for Square {
    fn screen(&self) -> (i64, i64, u8) {
        (0, 0, b'#')
    }
    fn web(&self) -> Vec<DrawCommand> {
        use planar::Point;
        vec![super::poly(vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
            Point::new(0., 0.),
        ])]
    }
}

#[test]
fn frames_as_json() {
    let (mut r, rx) = channel();
    assert!(matches!(r.start_frame(), Err(RenderError::NotInitialised)));
    r.init(40., 30.).unwrap();
    r.start_frame().unwrap();
    r.draw(&Square).unwrap();
    r.draw(&Square).unwrap();
    r.finish_frame().unwrap();

    let frame: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
    assert_eq!(frame["frame"], 0);
    assert_eq!(frame["width"], 40.);
    assert_eq!(frame["height"], 30.);
    let commands = frame["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0]["points"].as_array().unwrap().len(), 5);

    // commands don't leak into the next frame
    r.start_frame().unwrap();
    r.finish_frame().unwrap();
    let frame: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
    assert_eq!(frame["frame"], 1);
    assert!(frame["commands"].as_array().unwrap().is_empty());
}

#[test]
fn slow_consumer_loses_frames() {
    let (mut r, rx) = channel();
    r.init(10., 10.).unwrap();
    for _ in 0..3 {
        r.start_frame().unwrap();
        r.finish_frame().unwrap();
    }
    assert_eq!(r.dropped(), 2);
    let frame: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
    assert_eq!(frame["frame"], 0);
    assert!(rx.try_recv().is_err());

    drop(rx);
    r.start_frame().unwrap();
    assert!(matches!(r.finish_frame(), Err(RenderError::Disconnected)));
}

#[test]
fn hanging_up_ends_the_consumer() {
    let (mut r, rx) = channel();
    let consumer = std::thread::spawn(move || rx.into_iter().collect::<Vec<_>>());
    r.init(10., 10.).unwrap();
    r.start_frame().unwrap();
    r.draw(&Square).unwrap();
    r.finish_frame().unwrap();
    drop(r);

    // the last frame still arrives after the sender is gone
    let frames = consumer.join().unwrap();
    assert_eq!(frames.len(), 1);
    let frame: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(frame["frame"], 0);
    assert_eq!(frame["commands"].as_array().unwrap().len(), 1);
}
