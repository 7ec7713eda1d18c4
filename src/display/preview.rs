//! SDL2 window that shows a rendered frame. Built with `--features preview`.

use std::time::Duration;

use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::EventPump;

use super::PixelBuffer;
use crate::convert::convert_buffer;
use crate::format::PixelFormat;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

impl Display {
    /// Create a window sized to the frame's local (panel) resolution
    pub fn with_options(title: &str, width: u32, height: u32, vsync: bool) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;
        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            event_pump,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Convert the frame to ARGB8888 and show it
    pub fn present(&mut self, frame: &PixelBuffer) -> Result<(), String> {
        let argb = convert_buffer(frame, PixelFormat::ARGB8888).map_err(|e| e.to_string())?;
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, argb.width(), argb.height())
            .map_err(|e| e.to_string())?;
        texture
            .update(None, argb.as_bytes(), (argb.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Block until the window is closed or Escape is pressed
    pub fn wait_for_quit(&mut self) {
        info!("preview open, press Escape to close");
        loop {
            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => return,
                    _ => {},
                }
            }
            std::thread::sleep(Duration::from_millis(16));
        }
    }
}
