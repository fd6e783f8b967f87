mod conversations;
mod flows;
mod turns;
