pub mod alb;
