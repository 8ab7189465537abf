//! The assistant's command table.
//!
//! Registration order is dispatch order. Every command blocks except
//! `mention`, which only records activity and lets the scan continue.

use std::sync::Arc;

use brass::prelude::*;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset};

use crate::services::{Services, StockClient, TransitClient, WeatherClient};

pub const HELP_TEXT: &str = "指令列表
• 待辦：<內容> 新增待辦
• 待辦清單 查看待辦
• 模式：<名稱> 切換模式
• 筆記：<內容> 記下筆記
• 狀態 查看目前的模式與筆記
• 清除 清除你的對話資料
• 股價：<代號> 查詢股價
• 天氣[：<城市>] 查詢天氣
• 公車：<路線> [城市] 查詢到站時間";

pub const TODO_USAGE: &str = "用法：待辦：<內容>";
pub const MODE_USAGE: &str = "用法：模式：<名稱>";
pub const NOTE_USAGE: &str = "用法：筆記：<內容>";
pub const STOCK_USAGE: &str = "用法：股價：<代號>";
pub const BUS_USAGE: &str = "用法：公車：<路線> [城市]";

/// Attribute set by `mention`.
const LAST_MENTION: &str = "last_mention_at";

const TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Unix seconds as Taiwan local time.
fn format_time(unix_secs: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(unix_secs)
        .ok()?
        .to_offset(offset!(+8))
        .format(TIME_FORMAT)
        .ok()
}

/// Every command, in dispatch order.
pub fn commands(services: &Services) -> Vec<Command> {
    let mut commands = session_commands();
    commands.extend([
        stock(services.stock.clone()),
        weather(services.weather.clone()),
        weather_default(services.weather.clone()),
        bus(services.transit.clone()),
    ]);
    commands
}

/// Commands that only touch the session store.
pub fn session_commands() -> Vec<Command> {
    vec![
        mention(),
        help(),
        todo(),
        todo_list(),
        mode(),
        note(),
        status(),
        clear(),
    ]
}

fn mention() -> Command {
    Command::contains("mention", ["小幫手"])
        .block(false)
        .handler(|session: SessionRef| async move {
            session.update(|a| {
                a.set(LAST_MENTION, now());
            });
        })
}

fn help() -> Command {
    Command::exact("help", ["help", "說明", "幫助"]).handler(|| async { HELP_TEXT })
}

fn todo() -> Command {
    Command::prefix("todo", ["待辦", "todo"])
        .usage(TODO_USAGE)
        .handler(|content: Content, session: SessionRef| async move {
            let count = session.update(|a| {
                a.touch(now());
                a.push_todo(content.as_str())
            });
            format!("已新增待辦：{}（共 {count} 項）", content.as_str())
        })
}

fn todo_list() -> Command {
    Command::exact("todo_list", ["待辦清單", "todos"]).handler(|sessions: Sessions| async move {
        let todos = sessions
            .peek(sessions.key())
            .map(|s| s.read(|a| a.todos()))
            .unwrap_or_default();
        if todos.is_empty() {
            return "目前沒有待辦事項".to_string();
        }
        let items: Vec<String> = todos
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {item}", i + 1))
            .collect();
        format!("待辦清單\n{}", items.join("\n"))
    })
}

fn mode() -> Command {
    Command::prefix("mode", ["模式", "mode"])
        .usage(MODE_USAGE)
        .handler(|content: Content, session: SessionRef| async move {
            session.update(|a| {
                a.set_mode(content.as_str());
                a.touch(now());
            });
            format!("已切換為「{}」模式", content.as_str())
        })
}

fn note() -> Command {
    Command::prefix("note", ["筆記", "note"])
        .usage(NOTE_USAGE)
        .handler(|content: Content, session: SessionRef| async move {
            session.update(|a| {
                a.set_note(content.as_str());
                a.touch(now());
            });
            format!("已記下筆記：{}", content.as_str())
        })
}

fn status() -> Command {
    Command::exact("status", ["狀態", "status"]).handler(|sessions: Sessions| async move {
        let Some(session) = sessions.peek(sessions.key()) else {
            return "目前沒有任何紀錄".to_string();
        };
        session.read(|a| {
            let mut lines = vec![
                format!("模式: {}", a.mode().unwrap_or("一般")),
                format!("筆記: {}", a.note().unwrap_or("（無）")),
                format!("待辦: {} 項", a.todos().len()),
            ];
            if let Some(updated) = a.updated_at().and_then(format_time) {
                lines.push(format!("最後更新: {updated}"));
            }
            lines.join("\n")
        })
    })
}

fn clear() -> Command {
    Command::exact("clear", ["清除", "reset"]).handler(|sessions: Sessions| async move {
        if sessions.clear_current() {
            "已清除你的對話資料"
        } else {
            "目前沒有需要清除的資料"
        }
    })
}

fn stock(client: Arc<StockClient>) -> Command {
    Command::prefix("stock", ["股價", "stock"])
        .usage(STOCK_USAGE)
        .handler(move |code: Content| async move { client.reply(&code).await })
}

/// `天氣：<city>`; an empty city means the default one.
fn weather(client: Arc<WeatherClient>) -> Command {
    Command::prefix("weather", ["天氣", "weather"]).handler(
        move |city: Option<Content>| async move {
            let city = city.map(Content::into_inner).unwrap_or_default();
            client.reply(&city).await
        },
    )
}

/// Bare `天氣` without a delimiter.
fn weather_default(client: Arc<WeatherClient>) -> Command {
    Command::exact("weather_default", ["天氣", "weather"])
        .handler(move || async move { client.reply("").await })
}

fn bus(client: Arc<TransitClient>) -> Command {
    Command::prefix("bus", ["公車", "bus"])
        .usage(BUS_USAGE)
        .handler(move |query: Content| async move { client.reply(&query).await })
}
